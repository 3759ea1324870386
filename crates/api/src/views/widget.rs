//! Storefront carousel markup.

use serde::Serialize;
use shared::html::escape;

use domain::models::{SliderSettings, SlideView};

/// Public path the embedded slider assets are served under.
pub const ASSET_BASE: &str = "/modules/image-slider/";

/// Stylesheets and scripts the carousel needs, in load order.
pub const HEADER_STYLESHEETS: [&str; 1] = ["css/image_slider.css"];
pub const HEADER_SCRIPTS: [&str; 2] = ["js/responsive_slides.js", "js/image_slider.js"];

/// One slide as handed to the carousel template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSlide {
    #[serde(flatten)]
    pub slide: SlideView,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl WidgetSlide {
    /// `width="…" height="…"` attributes, empty when the size is unknown.
    pub fn size_attributes(&self) -> String {
        match (self.width, self.height) {
            (Some(w), Some(h)) => format!(r#"width="{}" height="{}""#, w, h),
            _ => String::new(),
        }
    }
}

/// View model of the carousel widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetModel {
    pub speed: u32,
    /// `"hover"` or empty.
    pub pause: &'static str,
    /// `"true"` or `"false"`.
    pub wrap: &'static str,
    pub slides: Vec<WidgetSlide>,
}

impl WidgetModel {
    pub fn new(settings: SliderSettings, slides: Vec<WidgetSlide>) -> Self {
        Self {
            speed: settings.speed,
            pause: settings.pause_mode(),
            wrap: settings.wrap_flag(),
            slides,
        }
    }
}

/// Carousel markup. Empty when there is nothing to show.
///
/// Descriptions are rich text authored in the admin and are emitted as is.
pub fn render_slider(model: &WidgetModel) -> String {
    if model.slides.is_empty() {
        return String::new();
    }

    let mut html = format!(
        r#"<div id="carousel" data-ride="carousel" class="carousel slide" data-interval="{}" data-wrap="{}" data-pause="{}">
  <ul class="carousel-inner" role="listbox">
"#,
        model.speed, model.wrap, model.pause
    );

    for (index, item) in model.slides.iter().enumerate() {
        let slide = &item.slide;
        let first = index == 0;
        html.push_str(&format!(
            r#"    <li class="carousel-item{active}" role="option" aria-hidden="{hidden}">
      <a href="{url}">
        <figure>
          <img src="{src}" alt="{alt}" {size}>
"#,
            active = if first { " active" } else { "" },
            hidden = if first { "false" } else { "true" },
            url = escape(&slide.url),
            src = escape(&slide.image_url),
            alt = escape(&slide.caption),
            size = item.size_attributes(),
        ));
        if !slide.title.is_empty() || !slide.description.is_empty() {
            html.push_str(&format!(
                r#"          <figcaption class="caption">
            <h2 class="display-1 text-uppercase">{}</h2>
            <div class="caption-description">{}</div>
          </figcaption>
"#,
                escape(&slide.title),
                slide.description
            ));
        }
        html.push_str("        </figure>\n      </a>\n    </li>\n");
    }

    html.push_str(
        r##"  </ul>
  <div class="direction" aria-label="Carousel buttons">
    <a class="left carousel-control" href="#carousel" role="button" data-slide="prev"><span class="icon-prev" aria-hidden="true">&lsaquo;</span></a>
    <a class="right carousel-control" href="#carousel" role="button" data-slide="next"><span class="icon-next" aria-hidden="true">&rsaquo;</span></a>
  </div>
</div>
"##,
    );
    html
}

/// `<link>` and `<script>` tags registered by the header hook.
pub fn render_header_assets() -> String {
    let mut html = String::new();
    for stylesheet in HEADER_STYLESHEETS {
        html.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}{}\" media=\"all\">\n",
            ASSET_BASE, stylesheet
        ));
    }
    for script in HEADER_SCRIPTS {
        html.push_str(&format!(
            "<script src=\"{}{}\" defer></script>\n",
            ASSET_BASE, script
        ));
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(id: i64, title: &str) -> WidgetSlide {
        WidgetSlide {
            slide: SlideView {
                id,
                position: id as i32,
                active: true,
                title: title.to_string(),
                caption: "cap".into(),
                description: "<p>Big <b>sale</b></p>".into(),
                url: "https://shop.example/?a=1&b=2".into(),
                image: format!("{}.png", id),
                image_url: format!("/media/slider/{}.png", id),
                is_shared: false,
            },
            width: Some(800),
            height: Some(300),
        }
    }

    #[test]
    fn test_empty_model_renders_nothing() {
        let model = WidgetModel::new(SliderSettings::default(), vec![]);
        assert_eq!(render_slider(&model), "");
    }

    #[test]
    fn test_render_carries_settings_and_slides() {
        let settings = SliderSettings {
            speed: 3000,
            pause_on_hover: false,
            wrap: true,
        };
        let model = WidgetModel::new(settings, vec![slide(1, "One"), slide(2, "Two & more")]);
        let html = render_slider(&model);

        assert!(html.contains(r#"data-interval="3000""#));
        assert!(html.contains(r#"data-wrap="true""#));
        assert!(html.contains(r#"data-pause="""#));
        assert!(html.contains(r#"<img src="/media/slider/1.png" alt="cap" width="800" height="300">"#));
        assert!(html.contains("Two &amp; more"));
        assert!(html.contains(r#"href="https://shop.example/?a=1&amp;b=2""#));
        assert!(html.contains("<p>Big <b>sale</b></p>"));
        assert_eq!(html.matches("carousel-item active").count(), 1);
        assert!(html.find("/1.png").unwrap() < html.find("/2.png").unwrap());
    }

    #[test]
    fn test_render_closes_with_direction_controls() {
        let model = WidgetModel::new(SliderSettings::default(), vec![slide(1, "One")]);
        let html = render_slider(&model);
        assert_eq!(html.matches(r##"href="#carousel""##).count(), 2);
        assert!(html.contains(r#"data-slide="prev""#));
        assert!(html.contains(r#"data-slide="next""#));
        assert!(html.trim_end().ends_with("</div>"));
    }

    #[test]
    fn test_unknown_size_has_no_attributes() {
        let mut item = slide(1, "One");
        item.width = None;
        assert_eq!(item.size_attributes(), "");
    }

    #[test]
    fn test_header_assets() {
        let html = render_header_assets();
        assert!(html.contains("/modules/image-slider/css/image_slider.css"));
        assert!(html.contains("/modules/image-slider/js/responsive_slides.js"));
        assert!(html.contains("/modules/image-slider/js/image_slider.js"));
    }

    #[test]
    fn test_model_serializes_view_variables() {
        let model = WidgetModel::new(SliderSettings::default(), vec![slide(1, "One")]);
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["speed"], 5000);
        assert_eq!(json["pause"], "hover");
        assert_eq!(json["wrap"], "true");
        assert_eq!(json["slides"][0]["imageUrl"], "/media/slider/1.png");
        assert_eq!(json["slides"][0]["width"], 800);
    }
}
