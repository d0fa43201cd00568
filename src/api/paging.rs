//! Paged listing: walk offsets until the server returns an empty page.

/// Fetch every record from a paged listing.
///
/// Starts at offset 0 and advances by `limit` after each page, stopping on
/// the first empty page; pages are concatenated in server order. Termination
/// holds because the source is finite and offsets only grow. Records are not
/// deduplicated, so the remote side must not be mutated concurrently.
pub(crate) fn fetch_all<T, E>(
    limit: usize,
    mut fetch_page: impl FnMut(usize, usize) -> Result<Vec<T>, E>,
) -> Result<Vec<T>, E> {
    let mut records = Vec::new();
    let mut offset = 0;

    loop {
        let page = fetch_page(limit, offset)?;
        if page.is_empty() {
            break;
        }
        tracing::debug!("Fetched page: offset={} len={}", offset, page.len());
        records.extend(page);
        offset += limit;
    }

    Ok(records)
}
