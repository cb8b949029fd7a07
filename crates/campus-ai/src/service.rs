//! AI features of the platform
//!
//! Each method builds one prompt, makes one call and never fails: a provider
//! error or an unusable answer is logged and replaced by a fallback.

use serde::Deserialize;
use std::sync::Arc;

use campus_types::meta_adapter::{NewModule, NewQuestion};

use crate::TextGenerator;
use crate::parse::parse_json;
use crate::prelude::*;

pub const FALLBACK_CONTENT: &str = "Error al generar contenido.";
pub const FALLBACK_SUMMARY: &str = "No se pudo generar el resumen del curso.";
pub const FALLBACK_MOTIVATION: &str = "¡Sigue esforzándote!";
pub const FALLBACK_ALERT: &str =
	"Hubo un problema al generar el consejo de la IA. Por favor, inténtalo más tarde.";

#[derive(Deserialize)]
struct CurriculumAnswer {
	#[serde(default)]
	modules: Vec<NewModule>,
}

#[derive(Deserialize)]
struct QuizAnswer {
	#[serde(default)]
	questions: Vec<NewQuestion>,
}

#[derive(Deserialize)]
struct MissingCoursesAnswer {
	#[serde(default)]
	suggested_courses: Vec<String>,
}

#[derive(Deserialize)]
struct RecommendationsAnswer {
	#[serde(default)]
	recommendations: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AiService {
	generator: Arc<dyn TextGenerator>,
}

impl AiService {
	pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
		Self { generator }
	}

	async fn text_or(&self, what: &str, prompt: &str, fallback: &str) -> String {
		match self.generator.generate(prompt).await {
			Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
			Ok(_) => fallback.to_string(),
			Err(e) => {
				warn!("AI {} failed: {}", what, e);
				fallback.to_string()
			}
		}
	}

	async fn json<T: serde::de::DeserializeOwned>(&self, what: &str, prompt: &str) -> Option<T> {
		match self.generator.generate(prompt).await {
			Ok(text) => parse_json(&text).ok(),
			Err(e) => {
				warn!("AI {} failed: {}", what, e);
				None
			}
		}
	}

	/// Module outline for a course, ordered from 1. Empty on failure.
	pub async fn generate_curriculum(&self, title: &str, description: &str) -> Vec<NewModule> {
		let prompt = format!(
			"You are an expert instructional designer. Design the curriculum of an online course.\n\
			Title: \"{title}\"\n\
			Description: \"{description}\"\n\n\
			Answer ONLY with a valid JSON object, no introduction or explanation. The object has a \
			key \"modules\" holding an array of objects with the keys \"title\" (string), \
			\"description\" (string) and \"order_index\" (integer starting at 1). \
			Generate between 15 and 20 modules. Write the content in Spanish."
		);
		let Some(answer) = self.json::<CurriculumAnswer>("curriculum", &prompt).await else {
			return Vec::new();
		};

		let mut modules: Vec<NewModule> =
			answer.modules.into_iter().filter(|m| !m.title.trim().is_empty()).collect();
		// Renumber when the model skipped or repeated indexes
		let mut seen = std::collections::HashSet::new();
		if modules.iter().any(|m| m.order_index < 1 || !seen.insert(m.order_index)) {
			for (idx, module) in modules.iter_mut().enumerate() {
				module.order_index = idx as i32 + 1;
			}
		}
		modules
	}

	/// Multiple choice questions for a module. Empty on failure.
	pub async fn generate_quiz(&self, module_title: &str, module_description: &str) -> Vec<NewQuestion> {
		let prompt = format!(
			"You are an expert in educational assessment. Create a short quiz for the module \
			\"{module_title}\" described as \"{module_description}\".\n\
			Answer ONLY with a valid JSON object with a key \"questions\" holding an array. Each \
			question has \"question_text\" and an array \"options\" of 4 objects, each option has \
			\"option_text\" and \"is_correct\" (boolean, exactly one true). Generate 5 questions. \
			Write the content in Spanish."
		);
		self.json::<QuizAnswer>("quiz", &prompt)
			.await
			.map(|answer| {
				answer
					.questions
					.into_iter()
					.filter(|q| !q.question_text.trim().is_empty() && !q.options.is_empty())
					.collect()
			})
			.unwrap_or_default()
	}

	/// Markdown lesson for a module
	pub async fn generate_module_content(&self, title: &str, description: &str) -> String {
		let prompt = format!(
			"You are an expert technology educator. Write the full content of a course lesson.\n\
			Module title: \"{title}\"\n\
			Module summary: \"{description}\"\n\n\
			Answer ONLY with Markdown text: start with a short introduction, use ## headings for \
			the main sections, use bullet or numbered lists for key concepts, include fenced code \
			examples when relevant and finish with a summary paragraph. Do not repeat the module \
			title. Write in Spanish."
		);
		self.text_or("module content", &prompt, FALLBACK_CONTENT).await
	}

	/// Markdown overview of the course goals and audience
	pub async fn course_summary(&self, title: &str, description: &str) -> String {
		let prompt = format!(
			"You are an academic advisor. Write an attractive and concise summary for this course.\n\
			Title: \"{title}\"\n\
			Description: \"{description}\"\n\n\
			Answer in Markdown, in Spanish, with a heading \"### ¿Qué aprenderás en este curso?\" \
			followed by 7 to 10 bullet points of learning goals, then a heading \
			\"### ¿A quién está dirigido?\" followed by a short paragraph about the ideal student."
		);
		self.text_or("course summary", &prompt, FALLBACK_SUMMARY).await
	}

	/// Course titles that would complete a learning path
	pub async fn suggest_missing_courses(&self, path_title: &str, existing: &[&str]) -> Vec<String> {
		let prompt = format!(
			"You are an expert curriculum designer for a technology e-learning platform.\n\
			The learning path is \"{path_title}\". Its existing courses are: {}.\n\
			Suggest 3 to 5 additional course titles that would logically complete this path.\n\
			Answer ONLY with a valid JSON object with a key \"suggested_courses\" holding an array \
			of strings. Write the titles in Spanish.",
			existing.join(", ")
		);
		self.json::<MissingCoursesAnswer>("path suggestions", &prompt)
			.await
			.map(|answer| {
				answer.suggested_courses.into_iter().filter(|t| !t.trim().is_empty()).collect()
			})
			.unwrap_or_default()
	}

	/// Picks the next courses for a student among `available`.
	/// Only exact titles from `available` are returned.
	pub async fn recommend_courses(&self, enrolled: &[&str], available: &[&str]) -> Vec<String> {
		if available.is_empty() {
			return Vec::new();
		}
		let prompt = format!(
			"You are an academic counselor on a technology e-learning platform.\n\
			A student is enrolled in: {}.\n\
			Other available courses are: {}.\n\
			Recommend 2 or 3 of the available courses as the next logical step.\n\
			Answer ONLY with a valid JSON object with a key \"recommendations\" holding an array \
			with the exact titles of the recommended courses.",
			enrolled.join(", "),
			available.join(", ")
		);
		self.json::<RecommendationsAnswer>("recommendations", &prompt)
			.await
			.map(|answer| {
				answer
					.recommendations
					.into_iter()
					.filter(|title| available.contains(&title.as_str()))
					.collect()
			})
			.unwrap_or_default()
	}

	/// One short sentence reacting to a quiz result
	pub async fn motivational_phrase(&self, score: u32, passed: bool) -> String {
		let prompt = if passed {
			format!(
				"You are a motivating tutor. Write one short sentence (at most 20 words, in Spanish) \
				congratulating a student who passed a quiz with {score}%."
			)
		} else {
			format!(
				"You are an understanding tutor. Write one short sentence (at most 20 words, in \
				Spanish) encouraging a student who failed a quiz with {score}% to review and try again."
			)
		};
		self.text_or("motivational phrase", &prompt, FALLBACK_MOTIVATION).await
	}

	/// Personal message from the instructor to a student about their progress
	pub async fn student_alert(&self, student_name: &str, course_title: &str, progress: u32) -> String {
		let progress = progress.min(100);
		let prompt = if progress >= 80 {
			format!(
				"You are an academic tutor. Write a short positive message in Spanish for \
				\"{student_name}\", who has completed {progress}% of the course \"{course_title}\". \
				Encourage one last effort."
			)
		} else {
			format!(
				"You are an academic tutor. Write a short supportive message in Spanish for \
				\"{student_name}\", who is at {progress}% of the course \"{course_title}\". \
				Encourage them to continue without pressure."
			)
		};
		self.text_or("student alert", &prompt, FALLBACK_ALERT).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;

	#[derive(Debug)]
	struct Canned(Option<&'static str>);

	#[async_trait]
	impl TextGenerator for Canned {
		async fn generate(&self, _prompt: &str) -> ClResult<String> {
			self.0.map(ToString::to_string).ok_or(Error::ServiceUnavailable("offline".into()))
		}
	}

	fn service(answer: Option<&'static str>) -> AiService {
		AiService::new(Arc::new(Canned(answer)))
	}

	#[tokio::test]
	async fn test_curriculum_from_fenced_json() {
		let ai = service(Some(
			"```json\n{\"modules\":[{\"title\":\"Intro\",\"description\":\"Basics\",\"order_index\":1},\
			{\"title\":\"Ownership\",\"description\":\"Borrowing\",\"order_index\":2}]}\n```",
		));
		let modules = ai.generate_curriculum("Rust", "Systems programming").await;
		assert_eq!(modules.len(), 2);
		assert_eq!(modules[1].title, "Ownership");
		assert_eq!(modules[1].order_index, 2);
	}

	#[tokio::test]
	async fn test_curriculum_renumbers_bad_indexes() {
		let ai = service(Some(
			r#"{"modules":[{"title":"A","order_index":0},{"title":"B","order_index":0}]}"#,
		));
		let modules = ai.generate_curriculum("X", "Y").await;
		let indexes: Vec<i32> = modules.iter().map(|m| m.order_index).collect();
		assert_eq!(indexes, vec![1, 2]);
	}

	#[tokio::test]
	async fn test_failures_degrade() {
		let ai = service(None);
		assert!(ai.generate_curriculum("X", "Y").await.is_empty());
		assert!(ai.generate_quiz("X", "Y").await.is_empty());
		assert_eq!(ai.motivational_phrase(40, false).await, FALLBACK_MOTIVATION);
		assert_eq!(ai.generate_module_content("X", "Y").await, FALLBACK_CONTENT);

		let ai = service(Some("not json at all"));
		assert!(ai.suggest_missing_courses("Data", &["Python"]).await.is_empty());
	}

	#[tokio::test]
	async fn test_quiz_parsing() {
		let ai = service(Some(
			r#"{"questions":[{"question_text":"2+2?","options":[{"option_text":"4","is_correct":true},{"option_text":"5","is_correct":false}]},{"question_text":"","options":[]}]}"#,
		));
		let questions = ai.generate_quiz("Math", "Sums").await;
		assert_eq!(questions.len(), 1);
		assert_eq!(questions[0].options.len(), 2);
		assert!(questions[0].options[0].is_correct);
	}

	#[tokio::test]
	async fn test_recommendations_keep_only_available_titles() {
		let ai = service(Some(r#"{"recommendations":["Docker","Kubernetes"]}"#));
		let titles = ai.recommend_courses(&["Linux"], &["Docker", "Go"]).await;
		assert_eq!(titles, vec!["Docker".to_string()]);
		assert!(ai.recommend_courses(&["Linux"], &[]).await.is_empty());
	}
}

// vim: ts=4
