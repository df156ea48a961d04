//! Oracle prompt assembly for metadata extraction

/// Builds the extraction prompt for one chunk of contract text
pub struct PromptBuilder {
    contract_text: String,
    schema_menu: String,
}

impl PromptBuilder {
    /// Create a new prompt builder for `contract_text` with the registry's
    /// schema menu
    pub fn new(contract_text: String, schema_menu: String) -> Self {
        Self {
            contract_text,
            schema_menu,
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n### Schema menu\n");
        prompt.push_str(&self.schema_menu);
        prompt.push_str("\n\n### Contract\n");
        prompt.push_str(&self.contract_text);
        prompt.push_str("\n### End\n");

        prompt
    }
}

const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert contract analyst.

**Goal**
Return a single **valid JSON object** that follows the selected schema and
contains the best structured metadata you can extract.

### 1. Decide `contract_type`
Give the document a short label (one or two words).

### 2. Pick schema
Select the schema from the menu whose name is closest to that label.
If nothing fits, pick `generic`.

### 3. Extract
Fill every key. Use null where data is absent.
Unknown but important extra fields -> `custom_fields` (key/value).
Detect common clauses (indemnification, confidentiality, non-compete, etc.)
and list them in `clauses`.

### Output rules
- **Return only JSON** (no markdown, no explanations).
- Must parse as JSON on first try."#;
