//! Server-rendered pages. Templates are compiled into the binary so the server
//! does not depend on its working directory.

use axum::response::Html;
use tera::{Context, Tera};

pub use tera::Error as RenderError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("main.html", include_str!("../templates/main.html")),
    ("item_form.html", include_str!("../templates/item_form.html")),
    ("item_detail.html", include_str!("../templates/item_detail.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("register.html", include_str!("../templates/register.html")),
];

pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<Html<String>, RenderError> {
        self.tera.render(template, context).map(Html)
    }
}
