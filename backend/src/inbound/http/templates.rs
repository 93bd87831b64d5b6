//! HTML templates compiled into the binary.

use std::sync::Arc;

use tera::{Context, Tera};

use crate::domain::Error;

const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../../../templates/base.html")),
    ("home.html", include_str!("../../../templates/home.html")),
    ("register.html", include_str!("../../../templates/register.html")),
    ("login.html", include_str!("../../../templates/login.html")),
    ("market.html", include_str!("../../../templates/market.html")),
];

/// Shared, read-only Tera instance.
#[derive(Clone)]
pub struct Templates {
    tera: Arc<Tera>,
}

impl Templates {
    /// Compile every embedded template.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, Error> {
        self.tera.render(name, context).map_err(|err| {
            tracing::error!(template = name, error = ?err, "template rendering failed");
            Error::internal(format!("failed to render {name}: {err}"))
        })
    }
}
