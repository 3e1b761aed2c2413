//! Turning a crawl session into a trip notification

use crate::model::CrawlSessionResult;
use crate::notify::Notification;
use crate::storage::NotificationRecord;
use serde_json::json;

/// Message type recorded for session digests
pub const DIGEST_MESSAGE_TYPE: &str = "crawl_digest";

/// Characters of page text kept in a digest's extra info
const EXTRA_INFO_CHARS: usize = 500;

/// Number of search hit titles listed as tips
const MAX_TIPS: usize = 5;

/// Who a digest is about and who receives it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripTarget {
    pub trip_id: String,
    pub leg_request_id: String,
    pub email: String,
}

/// Summarizes a session as a storable notification
///
/// The search hit titles become tips, the start of the extracted text becomes
/// the extra info, and the query with its hits is kept as the raw payload.
pub fn digest_record(session: &CrawlSessionResult, target: &TripTarget) -> NotificationRecord {
    let analysis = &session.analysis;
    let notification = match &session.error {
        Some(error) if !session.success => format!("Search failed: {}", error),
        _ => format!(
            "Read {} pages across {}/{} sites. {}",
            analysis.total_pages,
            analysis.successful_domains,
            analysis.total_domains,
            analysis.content_summary
        ),
    };

    let quick_tips = session
        .search_results
        .iter()
        .take(MAX_TIPS)
        .map(|hit| hit.title.clone())
        .collect();

    let extra_info = analysis
        .content_excerpt
        .chars()
        .take(EXTRA_INFO_CHARS)
        .collect();

    NotificationRecord {
        trip_id: target.trip_id.clone(),
        leg_request_id: target.leg_request_id.clone(),
        message_type: DIGEST_MESSAGE_TYPE.to_string(),
        notification,
        quick_tips,
        extra_info,
        raw_leg: json!({
            "query": session.query,
            "timestamp": session.timestamp,
            "search_results": session.search_results,
        }),
        email: target.email.clone(),
        title: format!("Results for \"{}\"", session.query),
    }
}

impl From<&NotificationRecord> for Notification {
    fn from(record: &NotificationRecord) -> Self {
        Self {
            title: record.title.clone(),
            body: record.notification.clone(),
            trip_id: record.trip_id.clone(),
            leg_request_id: record.leg_request_id.clone(),
            email_id: record.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Analysis, SearchResult};
    use chrono::Utc;

    fn target() -> TripTarget {
        TripTarget {
            trip_id: "trip-9".into(),
            leg_request_id: "leg-2".into(),
            email: "a@example.com".into(),
        }
    }

    #[test]
    fn test_digest_of_successful_session() {
        let session = CrawlSessionResult {
            query: "lisbon weather".into(),
            success: true,
            error: None,
            timestamp: Utc::now(),
            deep_crawl_enabled: true,
            search_results: (0..7)
                .map(|i| SearchResult {
                    title: format!("Hit {}", i),
                    snippet: String::new(),
                    url: format!("https://site{}.example/", i),
                })
                .collect(),
            domain_results: Vec::new(),
            analysis: Analysis {
                total_domains: 7,
                successful_domains: 6,
                total_pages: 12,
                content_summary: "Total content extracted: 900 characters".into(),
                content_excerpt: "x".repeat(900),
                ..Default::default()
            },
        };

        let record = digest_record(&session, &target());

        assert_eq!(record.trip_id, "trip-9");
        assert_eq!(record.message_type, DIGEST_MESSAGE_TYPE);
        assert_eq!(record.title, "Results for \"lisbon weather\"");
        assert_eq!(
            record.notification,
            "Read 12 pages across 6/7 sites. Total content extracted: 900 characters"
        );
        assert_eq!(record.quick_tips.len(), MAX_TIPS);
        assert_eq!(record.quick_tips[0], "Hit 0");
        assert_eq!(record.extra_info.len(), EXTRA_INFO_CHARS);
        assert_eq!(record.raw_leg["query"], "lisbon weather");

        let notification = Notification::from(&record);
        assert_eq!(notification.body, record.notification);
        assert_eq!(notification.email_id, "a@example.com");
    }

    #[test]
    fn test_digest_of_failed_session() {
        let session = CrawlSessionResult::no_results("nothing here", false);
        let record = digest_record(&session, &target());

        assert_eq!(record.notification, "Search failed: No search results found");
        assert!(record.quick_tips.is_empty());
        assert_eq!(record.extra_info, "");
    }
}
