use minijinja::{context, Environment};
use std::path::PathBuf;

use crate::error::Error;
use crate::site::RedirectStub;

pub const REDIRECT_TEMPLATE: &str = "redirect.html";

const DEFAULT_REDIRECT: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Redirecting...</title>
{%- if canonical %}
<link rel="canonical" href="{{ canonical }}">
{%- endif %}
<meta http-equiv="refresh" content="0; url={{ target }}">
</head>
<body>
Redirecting to <a id="target" href="{{ target }}">{{ target }}</a>...
<script>
var anchor = document.getElementById("target");
window.location.replace(anchor.href + window.location.hash);
</script>
</body>
</html>
"#;

/// Renders the pages the site build emits itself. Templates in the theme's custom directory
/// override the built-in ones.
pub struct Renderer {
    t: Environment<'static>,
}

impl Renderer {
    pub fn build(custom_dir: Option<PathBuf>) -> Result<Renderer, Error> {
        let mut t = Environment::new();
        t.set_undefined_behavior(minijinja::UndefinedBehavior::Chainable);

        let override_loader = custom_dir.map(minijinja::path_loader);
        t.set_loader(move |name| {
            if let Some(loader) = &override_loader {
                if let Some(source) = loader(name)? {
                    log::debug!("Using custom template `{name}`");
                    return Ok(Some(source));
                }
            }
            Ok((name == REDIRECT_TEMPLATE).then(|| DEFAULT_REDIRECT.to_owned()))
        });

        // surface template syntax errors before anything is written
        t.get_template(REDIRECT_TEMPLATE)?;

        Ok(Renderer { t })
    }

    pub fn redirect(&self, stub: &RedirectStub) -> Result<String, Error> {
        let template = self.t.get_template(REDIRECT_TEMPLATE)?;

        Ok(template.render(context! {
            target => &stub.target,
            canonical => &stub.canonical,
        })?)
    }
}
