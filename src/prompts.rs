use crate::models::{Platform, PostStyle};

pub const CAPTION_SYSTEM: &str = include_str!("../data/prompts/caption_system.txt");
pub const CAPTION_USER: &str = include_str!("../data/prompts/caption_user.txt");
pub const CAPTION_WITH_IMAGE_USER: &str =
    include_str!("../data/prompts/caption_with_image_user.txt");
pub const VISION_USER: &str = include_str!("../data/prompts/vision_user.txt");
pub const VISION_CONTEXT: &str = include_str!("../data/prompts/vision_context.txt");
pub const IMAGE_PROMPT: &str = include_str!("../data/prompts/image_prompt.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

pub fn caption_system(platform: Platform) -> String {
    render(
        CAPTION_SYSTEM,
        &[
            ("platform", platform.name()),
            ("platform_info", &platform.length_hint()),
        ],
    )
}

/// Instruction sent alongside an uploaded image. Blank context is omitted.
pub fn vision_user(platform: Platform, style: PostStyle, context: &str) -> String {
    let context = context.trim();
    let context = if context.is_empty() {
        String::new()
    } else {
        render(VISION_CONTEXT, &[("prompt", context)])
    };

    render(
        VISION_USER,
        &[
            ("style", style.name()),
            ("platform_info", &platform.length_hint()),
            ("context", &context),
        ],
    )
}

/// Caption instruction for a text prompt; `with_image` selects the variant
/// that asks the caption to complement a generated illustration.
pub fn caption_user(platform: Platform, style: PostStyle, prompt: &str, with_image: bool) -> String {
    let template = if with_image {
        CAPTION_WITH_IMAGE_USER
    } else {
        CAPTION_USER
    };

    render(
        template,
        &[
            ("style", style.name()),
            ("platform_info", &platform.length_hint()),
            ("prompt", prompt),
        ],
    )
}

pub fn image_prompt(platform: Platform, style: PostStyle, prompt: &str) -> String {
    let mut result = render(
        IMAGE_PROMPT,
        &[
            ("prompt", prompt.trim()),
            ("style", style.name()),
            ("platform", platform.name()),
        ],
    );
    if let Some(qualifier) = platform.image_qualifier() {
        result.push_str(", ");
        result.push_str(qualifier);
    }
    result
}
