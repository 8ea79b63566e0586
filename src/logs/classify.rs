use std::collections::BTreeMap;

/// Tag → matching lines, each bucket in original log order.
pub type Classified = BTreeMap<String, Vec<String>>;

fn tag_of<'t, S: AsRef<str>>(line: &str, tags: &'t [S]) -> Option<&'t str> {
    let mut found = tags
        .iter()
        .map(|tag| tag.as_ref())
        .filter(|tag: &&str| line.contains(*tag));
    let first = found.next()?;
    let rest: Vec<&str> = found.collect();
    if rest.is_empty() {
        Some(first)
    } else {
        log::warn!(
            "More than a single probe available for log line, skipping.\n{line}\n{:?}",
            std::iter::once(first).chain(rest).collect::<Vec<_>>()
        );
        None
    }
}

/// Bucket the lines of `log` by which single tag of `tags` they contain.
///
/// Lines with no tag are dropped. Lines with several tags are reported and
/// skipped.
pub fn classify<S: AsRef<str>>(log: &str, tags: &[S]) -> Classified {
    let mut buckets = Classified::new();
    for line in log.lines() {
        if let Some(tag) = tag_of(line, tags) {
            buckets
                .entry(tag.to_string())
                .or_default()
                .push(line.to_string());
        }
    }
    buckets
}

/// Every line carrying exactly one of `tags`, in log order.
pub fn filter_lines<S: AsRef<str>>(log: &str, tags: &[S]) -> Vec<String> {
    log.lines()
        .filter(|line| tag_of(line, tags).is_some())
        .map(str::to_string)
        .collect()
}
