use anyhow::bail;

use crate::api::validation::{validate_color, validate_slug};
use crate::config::Config;
use crate::db::Store;

pub async fn cmd_add_tag(
    config: &Config,
    name: &str,
    color: &str,
    slug: &str,
) -> anyhow::Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("Tag name must not be empty");
    }
    validate_color(color).map_err(anyhow::Error::msg)?;
    validate_slug(slug).map_err(anyhow::Error::msg)?;

    let store = Store::new(&config.general.database_path).await?;
    let tag = store.create_tag(name, color, slug).await?;

    println!("✓ Created tag '{}' (ID: {}, slug: {})", tag.name, tag.id, tag.slug);

    Ok(())
}
