//! "Open Support Thread": issue link to forum post

use crate::github::{IssueLookup, IssueRef, thread_title};

/// Reply when the target message has no issue embed
pub const NOT_AN_ISSUE: &str = "Can't process: The message does not link a GitHub issue.";

/// Longest thread name the platform accepts
pub const MAX_THREAD_TITLE: usize = 100;

/// Forum post to create for an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportThread {
    pub title: String,
    pub opening_message: String,
}

impl SupportThread {
    /// Private reply pointing the invoker at the new thread
    pub fn notice(thread_id: u64) -> String {
        format!("New support thread opened here: <#{}>", thread_id)
    }
}

/// Issue linked by a message's first embed, if any
pub fn linked_issue(embed_url: Option<&str>) -> Option<(IssueRef, String)> {
    let url = embed_url?;
    IssueRef::parse(url).ok().map(|issue| (issue, url.to_string()))
}

/// Build the thread for `issue`, asking `lookup` for its title
pub async fn plan_support_thread<L>(
    issue: &IssueRef,
    issue_url: &str,
    invoker_id: u64,
    message_link: &str,
    lookup: &L,
) -> SupportThread
where
    L: IssueLookup + ?Sized,
{
    let title = thread_title(lookup, issue).await;
    SupportThread {
        title: truncate_chars(&title, MAX_THREAD_TITLE),
        opening_message: format!(
            "<@{}> opened this thread based on {} to discuss about [this issue]({})",
            invoker_id, message_link, issue_url
        ),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
