//! Example: a greeter island inside a static page

use fos_islands::{ComponentDefinition, Injector, Options, PropDecl, PropType, TemplateRuntime};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Islands</title></head>
<body>
  <h1>Static header</h1>
  <div id="greeting" class="card" data-v-comp="Greeter" data-v:first-name="Jacky" data-v:last-name="Chan"></div>
  <p>Static footer</p>
</body>
</html>"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let greeter = ComponentDefinition::new("Greeter")
        .prop("firstName", PropDecl::new(PropType::String).required())
        .prop("lastName", PropDecl::new(PropType::String).required())
        .template("<span>Hello, <b>{{ firstName }} {{ lastName }}</b>!</span>");

    let mut document = fos_html::parse(PAGE);
    let mut injector = Injector::initialize(&mut document, TemplateRuntime::new(), Options::new().component(greeter))?;
    println!("{}", document.tree().inner_html(document.body()));

    // An outside script edits the host
    let host = document.get_element_by_id("greeting").ok_or_else(|| anyhow::anyhow!("host not rendered"))?;
    document.tree_mut().set_attribute(host, "data-v:first-name", "Chuck")?;
    let rerenders = injector.process_mutations(&mut document);

    println!("{} re-render(s)", rerenders);
    println!("{}", document.tree().inner_html(document.body()));
    Ok(())
}
