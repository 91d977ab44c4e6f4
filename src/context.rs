//! Builds the fixed system instruction the model sees for the whole session.

use crate::domain::email::NormalizedEmail;

pub const NOT_FOUND_REPLY: &str = "I don't see that information in your retrieved emails.";

const SEPARATOR: &str = "----------------------------------------";

/// First assistant turn, shown before the model has said anything.
pub fn greeting(count: usize) -> String {
    format!("I've analyzed your last {count} emails. How can I help?")
}

/// One numbered block per email, starting at 1.
pub fn format_emails(emails: &[NormalizedEmail]) -> String {
    emails
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "EMAIL #{}:\nFROM: {}\nSUBJECT: {}\nBODY:\n{}\n{}",
                i + 1,
                e.sender,
                e.subject,
                e.body,
                SEPARATOR
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn system_instruction(emails: &[NormalizedEmail]) -> String {
    let n = emails.len();
    format!(
        "You are a professional Gmail summarization assistant. \
Your task is to help users understand and interact with their emails.

The user has {n} emails in their inbox. Here they are:

{emails}

BASIC INSTRUCTIONS:
1. When asked to summarize emails, you MUST summarize ALL {n} emails
2. Number your summaries from 1 to {n}
3. Be concise but informative
4. The email you summarize is in a form paragraphs and bullet points
5. For specific questions about emails, provide accurate answers based only on the email content

If asked about information not in these emails, respond with:
\"{NOT_FOUND_REPLY}\"

Format your summaries as:
1. From: [sender]
   Subject: [subject]
   Summary: [brief summary of key points]

2. From: [sender]
   Subject: [subject]
   Summary: [brief summary of key points]
",
        emails = format_emails(emails),
    )
}
