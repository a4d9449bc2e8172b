//! Slash-separated node addresses.
//!
//! `a/b/c` walks labels from the top chain downward. Empty segments are
//! skipped, so leading, trailing and doubled slashes are harmless. Two
//! segments are special: `+` appends a new array element and `*` addresses
//! the last element.

/// One step of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Label(&'a str),
    Append,
    Last,
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Self {
        match raw {
            "+" => Self::Append,
            "*" => Self::Last,
            label => Self::Label(label),
        }
    }
}

pub(crate) fn segments(path: &str) -> impl Iterator<Item = Segment<'_>> + '_ {
    path.split('/').filter(|s| !s.is_empty()).map(Segment::parse)
}

/// `true` if the path names no node at all.
pub(crate) fn is_empty(path: &str) -> bool {
    segments(path).next().is_none()
}

/// Parses a label made only of ASCII digits. Array element labels are
/// compared numerically.
pub(crate) fn numeric_label(label: &[u8]) -> Option<u64> {
    if label.is_empty() {
        return None;
    }
    label.iter().try_fold(0u64, |n, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        n.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}
