use sea_orm::QuerySelect;

/// LIMIT used when only an offset was requested; SQLite needs a LIMIT before
/// OFFSET, so the open end is spelled as the largest signed 64-bit value.
const UNBOUNDED_LIMIT: u64 = 9_223_372_036_854_775_807;

/// Apply `skip` then `take`. Skip defaults to 0 and take to unbounded.
///
/// Both are clamped to `i64::MAX`, the largest value the store can bind.
#[must_use]
pub fn paginate<Q>(query: Q, skip: Option<u64>, take: Option<u64>) -> Q
where
    Q: QuerySelect,
{
    let skip = skip.unwrap_or(0).min(UNBOUNDED_LIMIT);
    let take = take.map(|take| take.min(UNBOUNDED_LIMIT));
    match (skip, take) {
        (0, None) => query,
        (0, Some(take)) => query.limit(take),
        (skip, take) => query.limit(take.unwrap_or(UNBOUNDED_LIMIT)).offset(skip),
    }
}
