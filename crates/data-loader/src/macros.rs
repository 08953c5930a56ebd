/// Read-through caching against a [`TtlCache`](crate::cache::TtlCache).
///
/// Returns the cached value when present. Otherwise evaluates `$block`
/// (which must produce a `Result`), stores the value, and returns it.
/// Errors from `$block` are returned as-is and nothing is stored.
///
/// # Example
/// ```rust,ignore
/// fn fetch_regions(&self) -> Result<Vec<Region>> {
///     cached!(self.cache, CacheKey::Regions, { self.inner.fetch_regions() })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $block:expr) => {{
        let key = $key;
        if let Some(cached) = $cache.get(&key)? {
            Ok(cached)
        } else {
            let value = $block?;
            $cache.set(&key, &value);
            Ok(value)
        }
    }};
}
