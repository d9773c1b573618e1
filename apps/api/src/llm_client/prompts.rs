// Cross-cutting prompt fragments shared by every screening step.
// Step-specific templates live in screening::prompts.

/// System prompt that enforces JSON-only output. Sent wherever the provider accepts one.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Closing instruction appended to every extraction and scoring prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond ONLY with a single valid JSON object. \
    No markdown, no comments, no explanation before or after it.";
