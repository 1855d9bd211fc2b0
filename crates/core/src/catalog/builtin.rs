//! The product's built-in block catalog.

use pe_protocol::block_models::{BlockKind, CatalogEntry};

use BlockKind::{Action, Condition, Integration, Reference};

/// `(subtype, label, description, kind)` for every built-in subtype.
const BUILTIN_ENTRIES: &[(&str, &str, &str, BlockKind)] = &[
    // Conditions
    ("condition-email-received", "Email Received", "When a new email arrives", Condition),
    ("condition-no-response", "No Email Response", "When email goes unanswered", Condition),
    ("condition-payment-failed", "Payment Failed", "When Stripe payment declines", Condition),
    ("condition-payment-success", "Payment Success", "When payment processes", Condition),
    ("condition-subscription-cancelled", "Subscription Cancelled", "When customer cancels", Condition),
    ("condition-trial-ending", "Trial Ending Soon", "When trial expires in X days", Condition),
    ("condition-high-usage", "High Usage Detected", "When limits are approaching", Condition),
    ("condition-support-ticket", "Support Ticket Created", "When customer needs help", Condition),
    ("condition-new-signup", "New User Signup", "When someone joins", Condition),
    ("condition-inactive-user", "User Inactive", "When user stops engaging", Condition),
    ("condition-order-placed", "Order Placed", "When new order comes in", Condition),
    ("condition-review-received", "Review Received", "When customer leaves review", Condition),
    ("condition-meeting-scheduled", "Meeting Scheduled", "When calendar event is booked", Condition),
    ("condition-form-submitted", "Form Submitted", "When form is completed", Condition),
    ("condition-scheduled-trigger", "Scheduled Trigger", "Runs on a fixed schedule", Condition),
    ("condition-if-then", "If/Then Logic", "Custom condition branching", Condition),
    // Actions
    ("action-send-email", "Send Email", "Send automated email", Action),
    ("action-reply-email", "Reply to Email", "Auto-reply to thread", Action),
    ("action-send-invoice", "Send Invoice", "Email invoice to customer", Action),
    ("action-resend-invoice", "Resend Invoice", "Retry failed payment", Action),
    ("action-alert-team", "Alert Team", "Notify team members", Action),
    ("action-schedule-followup", "Schedule Follow-up", "Set reminder for later", Action),
    ("action-create-task", "Create Task", "Add to task manager", Action),
    ("action-update-crm", "Update CRM", "Sync customer data", Action),
    ("action-apply-discount", "Apply Discount", "Send promotional offer", Action),
    ("action-pause-subscription", "Pause Subscription", "Temporarily halt billing", Action),
    ("action-cancel-subscription", "Cancel Subscription", "End customer subscription", Action),
    ("action-send-sms", "Send SMS", "Text message customer", Action),
    ("action-log-activity", "Log Activity", "Record to database", Action),
    ("action-webhook", "Call Webhook", "Trigger external API", Action),
    ("action-wait", "Wait", "Delay next action", Action),
    // Integrations
    ("integration-stripe", "Stripe", "Payment processing", Integration),
    ("integration-slack", "Slack", "Team messaging", Integration),
    ("integration-gmail", "Gmail", "Email integration", Integration),
    ("integration-outlook", "Outlook", "Email integration", Integration),
    ("integration-calendar", "Calendar", "Schedule & meetings", Integration),
    ("integration-salesforce", "Salesforce", "CRM integration", Integration),
    ("integration-hubspot", "HubSpot", "Marketing automation", Integration),
    ("integration-shopify", "Shopify", "E-commerce platform", Integration),
    ("integration-twilio", "Twilio", "SMS & calling", Integration),
    ("integration-github", "GitHub", "Code repository", Integration),
    ("integration-notion", "Notion", "Documentation", Integration),
    ("integration-database", "Database", "SQL/NoSQL queries", Integration),
    ("integration-analytics", "Analytics", "Track metrics", Integration),
    // Reference
    ("reference-note", "Note", "Add documentation", Reference),
    ("reference-checkpoint", "Checkpoint", "Mark important step", Reference),
    ("reference-custom", "Custom Step", "Placeholder for logic", Reference),
];

pub(crate) fn builtin_entries() -> Vec<CatalogEntry> {
    BUILTIN_ENTRIES
        .iter()
        .map(|(subtype, label, description, kind)| {
            CatalogEntry::new(*subtype, *label, *description, *kind)
        })
        .collect()
}
