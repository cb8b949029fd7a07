//! Email template rendering with Handlebars
//!
//! Templates are compiled into the binary. Each template has a subject line,
//! an HTML body and a plain text body, all rendered with the same variables.

use handlebars::Handlebars;

use crate::prelude::*;

struct TemplateDef {
	name: &'static str,
	subject: &'static str,
	html: &'static str,
	text: &'static str,
}

const TEMPLATES: &[TemplateDef] = &[TemplateDef {
	name: "verification",
	subject: "Verifica tu cuenta en Campus",
	html: r#"<!DOCTYPE html>
<html>
<body style="font-family: sans-serif; color: #222;">
	<h2>¡Hola {{username}}!</h2>
	<p>Gracias por registrarte. Haz clic en el siguiente enlace para activar tu cuenta:</p>
	<p><a href="{{link}}">Verificar mi cuenta</a></p>
	<p style="color: #777; font-size: 12px;">Si no creaste esta cuenta puedes ignorar este correo.</p>
</body>
</html>
"#,
	text: "¡Hola {{username}}!\n\n\
		Gracias por registrarte. Abre el siguiente enlace para activar tu cuenta:\n\n\
		{{{link}}}\n\n\
		Si no creaste esta cuenta puedes ignorar este correo.\n",
}];

/// Result of template rendering
#[derive(Debug)]
pub struct RenderResult {
	pub subject: String,
	pub html_body: String,
	pub text_body: String,
}

pub struct TemplateEngine {
	handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateEngine {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TemplateEngine").field("templates", &TEMPLATES.len()).finish()
	}
}

impl TemplateEngine {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();

		// Enable strict mode to catch undefined variables
		handlebars.set_strict_mode(true);

		for def in TEMPLATES {
			for (suffix, source) in
				[("subject", def.subject), ("html", def.html), ("text", def.text)]
			{
				handlebars
					.register_template_string(&format!("{}.{}", def.name, suffix), source)
					.map_err(|e| {
						Error::ConfigError(format!("Invalid email template {}: {}", def.name, e))
					})?;
			}
		}

		Ok(Self { handlebars })
	}

	pub fn render(&self, template_name: &str, vars: &serde_json::Value) -> ClResult<RenderResult> {
		if !TEMPLATES.iter().any(|def| def.name == template_name) {
			return Err(Error::ConfigError(format!("Template not found: {}", template_name)));
		}

		let render = |suffix: &str| {
			self.handlebars.render(&format!("{}.{}", template_name, suffix), vars).map_err(|e| {
				Error::ValidationError(format!(
					"Failed to render template '{}': {}",
					template_name, e
				))
			})
		};

		Ok(RenderResult {
			subject: render("subject")?,
			html_body: render("html")?,
			text_body: render("text")?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_render_verification() {
		let engine = TemplateEngine::new().unwrap();
		let res = engine
			.render(
				"verification",
				&json!({"username": "ana", "link": "http://localhost:3000/verify-email?token=a_b-c"}),
			)
			.unwrap();
		assert_eq!(res.subject, "Verifica tu cuenta en Campus");
		assert!(res.html_body.contains("¡Hola ana!"));
		assert!(res.html_body.contains("href=\"http://localhost:3000/verify-email?token"));
		assert!(res.text_body.contains("http://localhost:3000/verify-email?token=a_b-c"));
	}

	#[test]
	fn test_missing_variable_fails() {
		let engine = TemplateEngine::new().unwrap();
		let res = engine.render("verification", &json!({"username": "ana"}));
		assert!(matches!(res, Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_unknown_template() {
		let engine = TemplateEngine::new().unwrap();
		assert!(matches!(engine.render("welcome", &json!({})), Err(Error::ConfigError(_))));
	}
}

// vim: ts=4
