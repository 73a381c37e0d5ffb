//! Page selection parsing.
//!
//! A selection names the pages taken from one source, in the order they are
//! appended to the output:
//! - `"all"` - every page, ascending
//! - `"4"` - a single page
//! - `"12-14"` - an inclusive range, expanded ascending
//! - `"12-14, 1-5, 3"` - any comma-separated mix; order and duplicates are kept

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::PageRangeError;

/// Highest page number accepted in a selection.
///
/// PDF viewers cap documents at 8,388,607 pages, the largest indirect object
/// number a conforming reader must support.
pub const MAX_PAGE_NUMBER: u32 = 8_388_607;

/// An inclusive run of 1-based pages, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpan {
    start: u32,
    end: u32,
}

impl PageSpan {
    /// A span covering one page.
    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    /// First page of the span.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last page of the span.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of pages covered.
    pub fn len(&self) -> u64 {
        u64::from(self.end - self.start) + 1
    }

    /// Always false; a span covers at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pages of this span to visit in a source with `page_count` pages.
    ///
    /// Iteration stops at the first page past the end of the source, so an
    /// oversized span still reaches the page the importer rejects.
    fn clamped(&self, page_count: u32) -> RangeInclusive<u32> {
        let last = self.end.min(page_count.saturating_add(1)).max(self.start);
        self.start..=last
    }
}

impl fmt::Display for PageSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Pages selected from one source document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSelection {
    /// Every page of the source, in ascending order.
    #[default]
    All,
    /// Explicit page spans in merge order, kept unexpanded.
    Pages(Vec<PageSpan>),
}

impl PageSelection {
    /// Whether this selection takes every page.
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Page numbers to import from a source with `page_count` pages.
    ///
    /// Explicit selections keep their order and duplicates. Pages past
    /// `page_count` are still yielded, up to the first missing one in each
    /// span, so the importer reports them.
    pub fn pages(&self, page_count: u32) -> Vec<u32> {
        match self {
            Self::All => (1..=page_count).collect(),
            Self::Pages(spans) => spans
                .iter()
                .flat_map(|span| span.clamped(page_count))
                .collect(),
        }
    }
}

impl FromStr for PageSelection {
    type Err = PageRangeError;

    /// Parse a selection, treating a case-insensitive `"all"` as [`PageSelection::All`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        parse_page_spans(s).map(Self::Pages)
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Pages(spans) => {
                let joined = spans
                    .iter()
                    .map(PageSpan::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                f.write_str(&joined)
            }
        }
    }
}

/// Expand a page selection expression into page numbers.
///
/// Whitespace is ignored anywhere in the expression. Ranges expand in
/// ascending order at their position; the overall result keeps the order
/// and duplicates of the expression.
///
/// # Errors
///
/// - [`PageRangeError::StartAfterEnd`] for a range like `"7-3"`
/// - [`PageRangeError::Malformed`] for empty tokens, non-numeric parts,
///   page `0`, pages above [`MAX_PAGE_NUMBER`], or tokens with more than one
///   hyphen such as `"3-5-7"`
/// - [`PageRangeError::TooManyPages`] if the expansion would exceed
///   [`MAX_PAGE_NUMBER`] pages
///
/// # Examples
///
/// ```
/// use pdfmerger::merge::pages::parse_page_range;
///
/// assert_eq!(parse_page_range("1-3,7").unwrap(), vec![1, 2, 3, 7]);
/// assert_eq!(parse_page_range("12-14, 1").unwrap(), vec![12, 13, 14, 1]);
/// assert!(parse_page_range("7-3").is_err());
/// ```
pub fn parse_page_range(expression: &str) -> Result<Vec<u32>, PageRangeError> {
    let spans = parse_page_spans(expression)?;

    let total: u64 = spans.iter().map(PageSpan::len).sum();
    if total > u64::from(MAX_PAGE_NUMBER) {
        return Err(PageRangeError::TooManyPages {
            pages: total,
            limit: MAX_PAGE_NUMBER,
        });
    }

    Ok(spans
        .iter()
        .flat_map(|span| span.start..=span.end)
        .collect())
}

/// Parse a page selection expression into unexpanded spans.
///
/// Accepts the same grammar as [`parse_page_range`] and fails the same way,
/// except that the total number of pages is not limited.
pub fn parse_page_spans(expression: &str) -> Result<Vec<PageSpan>, PageRangeError> {
    let compact: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    let mut spans = Vec::new();

    for token in compact.split(',') {
        let parts: Vec<&str> = token.split('-').collect();

        match parts.as_slice() {
            [start, end] => {
                let start = parse_page_number(token, start)?;
                let end = parse_page_number(token, end)?;

                if start > end {
                    return Err(PageRangeError::StartAfterEnd { start, end });
                }

                spans.push(PageSpan { start, end });
            }
            [page] => spans.push(PageSpan::single(parse_page_number(token, page)?)),
            _ => {
                return Err(PageRangeError::Malformed {
                    token: token.to_string(),
                    reason: "expected a page number or a single 'start-end' range",
                });
            }
        }
    }

    Ok(spans)
}

fn parse_page_number(token: &str, part: &str) -> Result<u32, PageRangeError> {
    if part.is_empty() {
        return Err(PageRangeError::Malformed {
            token: token.to_string(),
            reason: "missing page number",
        });
    }

    let page: u32 = part.parse().map_err(|_| PageRangeError::Malformed {
        token: token.to_string(),
        reason: "page numbers must be positive integers",
    })?;

    if page == 0 {
        return Err(PageRangeError::Malformed {
            token: token.to_string(),
            reason: "page numbers are 1-indexed",
        });
    }

    if page > MAX_PAGE_NUMBER {
        return Err(PageRangeError::Malformed {
            token: token.to_string(),
            reason: "page number exceeds 8388607",
        });
    }

    Ok(page)
}
