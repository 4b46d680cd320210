//! Prompt construction for the summarize stage.

use super::document::Document;

/// Section outline the model is asked to follow.
pub const SUMMARY_SECTIONS: [&str; 8] = [
    "Introduction",
    "Methodology or Approach",
    "Key Insights",
    "Challenges / Research Gaps",
    "Real-World Applications",
    "Future Scope and Opportunities",
    "Conclusion",
    "References",
];

const SECTION_GUIDANCE: [&str; 8] = [
    "Introduce the topic, its background and why it matters to current research or industry.",
    "Describe how current work approaches the topic: algorithms, frameworks or methods in common use.",
    "Summarize the major findings, advances and trends across the documents in complete sentences.",
    "Identify open problems, limitations and areas that lack exploration.",
    "Give examples of products, industries or scenarios where the topic is applied.",
    "Discuss future directions, open questions and emerging trends.",
    "Summarize the overall understanding and what the reader should take away.",
    "List the key papers, tools or sources mentioned in the reference documents, if any.",
];

const LENGTH_INSTRUCTION: &str = "Please summarize concisely within 600-700 words with bullet points, \
include clear points and short paragraphs";

/// Build the academic-summary prompt for `topic` over `documents`.
pub fn build_summary_prompt(topic: &str, documents: &[Document]) -> String {
    let mut prompt = String::from(
        "You are an expert academic research assistant. Write a clear, well-structured \
         research summary of the topic below using the reference documents provided.\n\n\
         Use exactly these sections:\n\n",
    );
    for (i, (title, guidance)) in SUMMARY_SECTIONS.iter().zip(SECTION_GUIDANCE).enumerate() {
        prompt.push_str(&format!("## {}. {title}\n{guidance}\n\n", i + 1));
    }

    prompt.push_str(&format!("### Topic:\n{topic}\n\n### Reference Documents:\n"));
    let docs_text = documents
        .iter()
        .map(|d| format!("Title: {}\nContent: {}", d.title, d.prompt_text()))
        .collect::<Vec<_>>()
        .join("\n\n");
    prompt.push_str(&docs_text);
    prompt.push_str("\n\n");
    prompt.push_str(LENGTH_INSTRUCTION);
    prompt.push_str(
        "\n\nWrite in a formal academic tone with logical flow between paragraphs.\n",
    );
    prompt
}

/// Narrative substituted when the LLM call fails.
pub fn summary_placeholder(topic: &str) -> String {
    format!(
        "Topic: {topic}\nError generating structured summary. Please check your API configuration or input."
    )
}
