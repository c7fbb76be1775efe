use study_core::model::{QuestionBank, TopicMaterial};

const SECTIONS: [&str; 7] = [
    "Basic definition and intuitive explanation, with a real-world analogy",
    "Key concepts and how it works step by step",
    "Complexity analysis: time (best, average, worst) and space, and why",
    "Common use cases and when to reach for it",
    "Implementation example with the key details and common variations",
    "Common pitfalls, best practices and optimizations",
    "Related concepts and how they compare",
];

/// Wrap a learner's question in instructions, adding curriculum context when
/// it mentions a topic from the bank.
#[must_use]
pub fn build_prompt(question: &str, bank: &QuestionBank) -> String {
    let mut prompt = String::from(
        "You are a data structures and algorithms tutor giving clear, complete answers.\n\n",
    );
    prompt.push_str("Question: ");
    prompt.push_str(question.trim());
    prompt.push_str("\n\nStructure the answer in these sections:\n");
    for (i, section) in SECTIONS.iter().enumerate() {
        prompt.push_str(&format!("{}. {section}\n", i + 1));
    }
    let context = bank
        .topic_mentioned_in(question)
        .and_then(|(topic, material)| curriculum_context(material).map(|c| (topic, c)));
    if let Some((topic, context)) = context {
        prompt.push_str(&format!(
            "\nAdditional context from our {topic} curriculum: {context}\n"
        ));
    }
    prompt.push_str("\nFormat the response in markdown.");
    prompt
}

fn curriculum_context(material: &TopicMaterial) -> Option<&str> {
    material
        .description
        .as_deref()
        .or_else(|| material.questions.iter().find_map(|q| q.explanation()))
        .filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::Question;

    fn bank() -> QuestionBank {
        let mut bank = QuestionBank::new();
        let question = Question::new("q", vec!["a".into(), "b".into()], "a")
            .unwrap()
            .with_explanation("Graphs model pairwise relations.");
        bank.insert("Graphs", TopicMaterial::new(vec![question]));
        bank
    }

    #[test]
    fn mentioned_topic_adds_context() {
        let prompt = build_prompt("How do I traverse graphs?", &bank());
        assert!(prompt.contains("Question: How do I traverse graphs?"));
        assert!(prompt.contains("Graphs model pairwise relations."));
    }

    #[test]
    fn unrelated_question_has_no_context() {
        let prompt = build_prompt("What is a heap?", &bank());
        assert!(!prompt.contains("curriculum"));
        assert!(prompt.contains("7. Related concepts"));
    }
}
