use crate::schema::PropertySchema;

/// Renders the instructions sent to the model alongside the document text.
pub struct PromptBuilder<'a> {
    schema: &'a PropertySchema,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(schema: &'a PropertySchema) -> Self {
        Self { schema }
    }

    pub fn system_instruction(&self) -> String {
        let mut prompt = String::from(
            "You are a highly specialized real estate data extraction bot. Your task is to parse \
             the provided text from a real estate property PDF and extract key details into a \
             structured JSON format. The text may be messy, so you must be careful when \
             identifying the correct information. The output must strictly adhere to the \
             following JSON schema:\n",
        );
        prompt.push_str(&self.schema.to_json_shape());
        prompt.push_str("\n\nFields:\n");

        for field in self.schema.fields() {
            prompt.push_str(&format!("- '{}': {}.\n", field.name, field.hint));
        }

        prompt.push_str(
            "\nRules:\n\
             - 'price' must be a numeric value only (e.g., 1250000, not '$1.25M').\n\
             - 'description' must be a single paragraph of text describing the property.\n\
             - 'features' must be an array of short key selling points or amenities, in the \
             order they appear.\n\
             - If a field is not stated in the text, use null. Never guess a value.\n\
             - Respond with a single JSON object and nothing else.\n",
        );

        prompt
    }

    /// System instruction for a second attempt after a reply that was not a JSON object.
    pub fn strict_instruction(&self) -> String {
        let mut prompt = self.system_instruction();
        prompt.push_str(
            "\nIMPORTANT: your previous reply could not be parsed. Reply with exactly one JSON \
             object containing every key of the schema above, using null for unknown values. \
             Do not wrap it in markdown and do not add any commentary.\n",
        );
        prompt
    }
}
