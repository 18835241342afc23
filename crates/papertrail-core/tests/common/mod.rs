use papertrail_core::model::{Attribute, ContentSchema, SchemaKind};
use papertrail_core::InMemorySchemaRegistry;
use std::sync::Arc;

#[allow(dead_code)]
pub const ARTICLE: &str = "api::article.article";

#[allow(dead_code)]
pub const HOMEPAGE: &str = "api::homepage.homepage";

/// Registry with an audited `article` collection, an unaudited `homepage`
/// single type, and the components both reference
#[allow(dead_code)]
pub fn registry() -> InMemorySchemaRegistry {
    let article = ContentSchema::new(ARTICLE)
        .with_kind(SchemaKind::CollectionType)
        .with_api_names("article", "articles")
        .with_audit(true)
        .with_attribute("title", Attribute::scalar("string"))
        .with_attribute("slug", Attribute::scalar("uid"))
        .with_attribute("views", Attribute::scalar("integer"))
        .with_attribute("tags", Attribute::scalar("json"))
        .with_attribute("cover", Attribute::media(false))
        .with_attribute("gallery", Attribute::media(true))
        .with_attribute("author", Attribute::relation("manyToOne", "api::author.author"))
        .with_attribute("seo", Attribute::component("shared.seo", false))
        .with_attribute("faqs", Attribute::component("shared.faq", true))
        .with_attribute("blocks", Attribute::dynamic_zone(&["blocks.text", "blocks.quote"]))
        .with_attribute("tree", Attribute::component("nested.node", false));

    let homepage = ContentSchema::new(HOMEPAGE)
        .with_kind(SchemaKind::SingleType)
        .with_api_names("homepage", "homepages")
        .with_attribute("headline", Attribute::scalar("string"));

    InMemorySchemaRegistry::new()
        .with_content_type(article)
        .with_content_type(homepage)
        .with_component(
            ContentSchema::new("shared.seo")
                .with_attribute("metaTitle", Attribute::scalar("string"))
                .with_attribute("metaImage", Attribute::media(false)),
        )
        .with_component(
            ContentSchema::new("shared.faq")
                .with_attribute("question", Attribute::scalar("string"))
                .with_attribute("answer", Attribute::scalar("text")),
        )
        .with_component(ContentSchema::new("blocks.text").with_attribute("body", Attribute::scalar("richtext")))
        .with_component(
            ContentSchema::new("blocks.quote")
                .with_attribute("quote", Attribute::scalar("text"))
                .with_attribute("by", Attribute::scalar("string")),
        )
        .with_component(
            ContentSchema::new("nested.node")
                .with_attribute("label", Attribute::scalar("string"))
                .with_attribute("child", Attribute::component("nested.node", false)),
        )
}

#[allow(dead_code)]
pub fn article(registry: &InMemorySchemaRegistry) -> Arc<ContentSchema> {
    use papertrail_core::SchemaRegistry;
    registry.resolve(ARTICLE).expect("article schema registered")
}
