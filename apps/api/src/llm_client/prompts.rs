// Shared prompt fragments for every generation call.
// Design-specific prompts live in design/prompts.rs.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// The response shape every design call must return.
pub const HTML_RESPONSE_CONTRACT: &str = "\
    Return exactly one JSON object of the form {\"html\": \"<!DOCTYPE html>...\"}. \
    The `html` value is the complete document as a single JSON string, \
    with quotes and newlines escaped.";

/// Instruction that keeps the model from inventing résumé content.
pub const FIDELITY_INSTRUCTION: &str = "\
    CRITICAL: Use only the facts present in the resume text. \
    Do NOT invent employers, dates, metrics, degrees or contact details. \
    You may reorder sections and adjust emphasis, never content.";
