//! Prompt text for autopilot generation.

use crate::provider::GenerationRequest;
use crate::types::MissingKind;

/// Fixed system prompt sent with every autopilot generation call.
pub const AUTOPILOT_SYSTEM_PROMPT: &str = "\
You are a senior subject-matter author writing study material for students.
STYLE RULES:
1. No conversational filler. Never greet, never say \"In this chapter\", \"Let's\", or \"Sure\".
2. Never address the reader directly. No \"you\" or \"your\".
3. Use labeled callouts only in these styles: **Key Point:**, **Remember:**, **Common Mistake:**, **Exam Tip:**.
4. Open every topic with a short rhetorical question that frames the idea.
5. Prefer comparison tables over long paragraphs whenever two or more things are contrasted.
6. Show processes as text-arrow flow diagrams, e.g. Cause -> Effect -> Result.
7. Close each topic with these named sections: \"Quick Recap\", \"Did You Know?\" and \"Practice Zone\".
Output clean semantic HTML only.";

/// Build the user message describing the gap and the expected JSON answer.
pub fn build_user_prompt(request: &GenerationRequest) -> String {
    let mut header = format!(
        "Board: {}\nClass: {}\n",
        request.board, request.class_level
    );
    if let Some(stream) = request.stream {
        header.push_str(&format!("Stream: {}\n", stream));
    }
    header.push_str(&format!(
        "Subject: {}\nChapter: {}\nLanguage: {}\nMode: {}\n",
        request.subject.name, request.chapter.title, request.language, request.mode
    ));

    let task = match request.missing_kind {
        MissingKind::PremiumNotes if request.dual_generation => {
            "Write complete premium notes for this chapter and a shorter free summary of the same \
             notes. Answer with a JSON object: {\"notesHtml\": string, \"freeNotesHtml\": string, \
             \"notesHtmlHi\": string (Hindi translation of notesHtml, optional)}."
                .to_string()
        }
        MissingKind::PremiumNotes => {
            "Write complete premium notes for this chapter. Answer with a JSON object: \
             {\"notesHtml\": string, \"notesHtmlHi\": string (optional)}."
                .to_string()
        }
        MissingKind::SimpleMcq => format!(
            "Write {} new multiple-choice questions for this chapter (already available: {}). \
             Answer with a JSON object: {{\"mcqData\": [{{\"question\": string, \"options\": \
             [string, string, string, string], \"correctAnswer\": number (0-based index), \
             \"explanation\": string}}], \"mcqDataHi\": same shape in Hindi (optional)}}.",
            request.target_count, request.base_count
        ),
    };

    format!("{header}\n{task}\nReturn only the JSON object, no commentary.")
}
