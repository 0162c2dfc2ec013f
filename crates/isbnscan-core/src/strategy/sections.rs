//! Scan order for documents that come as a list of sections (EPUB spine
//! files, HTML chapters) instead of pages.

use crate::config::ScanConfig;
use crate::identifier::Identifier;
use crate::scanner::IdentifierScanner;
use std::ops::Range;
use tracing::info;

/// (minimum section count, sections at the front, sections at the back)
const SECTION_SCANS: [(usize, usize, usize); 6] = [
    (15, 10, 5),
    (10, 6, 4),
    (6, 4, 2),
    (3, 2, 1),
    (2, 1, 1),
    (1, 1, 0),
];

/// Index ranges of the front, back and middle sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPlan {
    pub front: Range<usize>,
    pub back: Range<usize>,
    pub middle: Range<usize>,
}

pub fn plan_sections(count: usize) -> SectionPlan {
    let Some(&(_, front, back)) = SECTION_SCANS.iter().find(|(min, _, _)| count >= *min) else {
        return SectionPlan {
            front: 0..0,
            back: 0..0,
            middle: 0..0,
        };
    };

    let front_end = front.min(count);
    let back_start = count.saturating_sub(back).max(front_end);
    SectionPlan {
        front: 0..front_end,
        back: back_start..count,
        middle: front_end..back_start,
    }
}

/// Scan sections front first, then the back in reverse, then the middle,
/// stopping as soon as an ISBN-13 is found.
pub fn scan_sections<S: AsRef<str>>(sections: &[S], config: &ScanConfig) -> Option<Identifier> {
    let plan = plan_sections(sections.len());
    info!(
        front = plan.front.len(),
        back = plan.back.len(),
        middle = plan.middle.len(),
        "scanning sections"
    );

    let mut scanner = IdentifierScanner::new(config);

    for section in &sections[plan.front.clone()] {
        scanner.feed(section.as_ref());
        if scanner.has_identifier() {
            return scanner.into_result();
        }
    }

    for section in sections[plan.back.clone()].iter().rev() {
        scanner.feed_reversed(section.as_ref());
        if scanner.has_identifier() {
            return scanner.into_result();
        }
    }

    for section in &sections[plan.middle.clone()] {
        scanner.feed(section.as_ref());
        if scanner.has_identifier() {
            break;
        }
    }

    scanner.into_result()
}
