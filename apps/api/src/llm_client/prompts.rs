// Shared prompt fragments.
// Each component that calls the completion endpoint keeps its own prompts.rs;
// this file holds the cross-cutting pieces.

/// System prompt for calls whose reply is parsed mechanically.
pub const STRUCTURED_REPLY_SYSTEM: &str = "You are a precise, structured assistant. \
    Reply with the requested structure only. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Reminder appended to prompts that receive masked resume text.
pub const MASKED_INPUT_NOTE: &str = "\
    Personal details in the text have been replaced with placeholders such as \
    [EMAIL], [PHONE], [ADDRESS], [CITY] and [STATE]. Ignore the placeholders.";
