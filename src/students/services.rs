use super::dto::StudentRequest;
use crate::summarizer::Summarizer;

pub fn build_prompt(student: &StudentRequest) -> String {
    let marks = student
        .marks
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Create a short summary for this student:\n\nName: {}\nAge: {}\nMarks: [{}]\n",
        student.name, student.age, marks
    )
}

pub async fn summarize(
    summarizer: &dyn Summarizer,
    student: &StudentRequest,
) -> anyhow::Result<String> {
    summarizer.generate(&build_prompt(student)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> StudentRequest {
        StudentRequest {
            name: "Ravi".into(),
            age: 17,
            marks: vec![88, 92, 75],
        }
    }

    #[test]
    fn prompt_lists_every_field() {
        let prompt = build_prompt(&student());
        assert!(prompt.starts_with("Create a short summary for this student:"));
        assert!(prompt.contains("Name: Ravi\n"));
        assert!(prompt.contains("Age: 17\n"));
        assert!(prompt.contains("Marks: [88, 92, 75]"));
    }

    #[test]
    fn empty_marks_render_as_empty_list() {
        let mut s = student();
        s.marks.clear();
        assert!(build_prompt(&s).contains("Marks: []"));
    }
}
