//! Admin page fragments: settings form, slide form, slide list and notices.

use std::collections::BTreeMap;

use domain::models::{Language, ShopContext, ShopDirectory, SlideView, TranslationInput};
use shared::html::escape;

use crate::views::widget::ASSET_BASE;

pub const MULTISHOP_WARNING: &str = "You cannot manage slides items from a \"All Shops\" or a \"Group Shop\" context, select directly the shop you want to edit";
pub const ADD_CONTEXT_ERROR: &str =
    "You cannot add slides from a \"All Shops\" or a \"Group Shop\" context";
pub const SHARED_SLIDE_WARNING: &str = "This slide is shared with other shops! All shops associated to this slide will apply modifications made here";
pub const MULTI_LANGUAGE_INFO: &str = "Since multiple languages are activated on your shop, please mind to upload your image for each one of them";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Danger,
    Warning,
    Info,
    Success,
}

impl AlertKind {
    fn class(&self) -> &'static str {
        match self {
            AlertKind::Danger => "alert-danger",
            AlertKind::Warning => "alert-warning",
            AlertKind::Info => "alert-info",
            AlertKind::Success => "alert-success",
        }
    }
}

/// Alert box listing `messages`, one per line.
pub fn alert(kind: AlertKind, messages: &[String]) -> String {
    let body = messages
        .iter()
        .map(|m| escape(m))
        .collect::<Vec<_>>()
        .join("<br />");
    format!(r#"<div class="alert {}">{}</div>"#, kind.class(), body)
}

pub fn alert_one(kind: AlertKind, message: &str) -> String {
    alert(kind, &[message.to_string()])
}

/// Error shown when a slide is opened from a shop it is not associated with.
pub fn edit_context_error(shop_names: &[String]) -> String {
    let names = shop_names
        .iter()
        .map(|n| escape(n))
        .collect::<Vec<_>>()
        .join("<br/>");
    format!(
        r#"<div class="alert alert-danger">You can only edit this slide from the shop(s) context: {}</div>"#,
        names
    )
}

/// Which shops a settings change applies to. `None` for single-shop setups.
pub fn scope_info(directory: &ShopDirectory, context: ShopContext) -> Option<String> {
    if directory.shops().len() < 2 {
        return None;
    }
    let message = match context {
        ShopContext::Shop(id) => {
            let name = directory
                .get(id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| id.to_string());
            format!("The modifications will be applied to shop: {}", name)
        }
        ShopContext::Group(group_id) => {
            format!("The modifications will be applied to this group: {}", group_id)
        }
        ShopContext::All => "The modifications will be applied to all shops and shop groups".to_string(),
    };
    Some(alert_one(AlertKind::Info, &message))
}

/// Confirmation for the `conf` flag carried by post-mutation redirects.
pub fn confirmation_message(conf: u8) -> Option<&'static str> {
    match conf {
        1 => Some("Successful deletion."),
        3 => Some("Successful creation."),
        4 => Some("Successful update."),
        6 => Some("The settings have been successfully updated."),
        _ => None,
    }
}

fn switch(name: &str, label: &str, on: bool, help: &str) -> String {
    format!(
        r#"<div class="form-group">
  <label>{label}</label>
  <label><input type="radio" name="{name}" value="1"{yes}> Yes</label>
  <label><input type="radio" name="{name}" value="0"{no}> No</label>
  <p class="help-block">{help}</p>
</div>
"#,
        label = label,
        name = name,
        yes = if on { " checked" } else { "" },
        no = if on { "" } else { " checked" },
        help = help,
    )
}

/// Values shown in the settings form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFormValues {
    pub speed: String,
    pub pause_on_hover: bool,
    pub wrap: bool,
}

pub fn settings_form(values: &SettingsFormValues, action_url: &str) -> String {
    let mut html = format!(
        r#"<form id="slider-settings" method="post" action="{action}" enctype="multipart/form-data" class="panel">
<h3>Settings</h3>
<div class="form-group">
  <label for="SPEED">Speed</label>
  <input type="text" id="SPEED" name="SPEED" value="{speed}" class="fixed-width-sm"> milliseconds
  <p class="help-block">The duration of the transition between two slides.</p>
</div>
"#,
        action = escape(action_url),
        speed = escape(&values.speed),
    );
    html.push_str(&switch(
        "PAUSE_ON_HOVER",
        "Pause on hover",
        values.pause_on_hover,
        "Stop sliding when the mouse cursor is over the slideshow.",
    ));
    html.push_str(&switch(
        "WRAP",
        "Loop forever",
        values.wrap,
        "Loop or stop after the last slide.",
    ));
    html.push_str(
        r#"<button type="submit" name="submitSettings" value="1" class="btn btn-primary">Save</button>
</form>
"#,
    );
    html
}

/// State of the add/edit slide form.
#[derive(Debug, Clone)]
pub struct SlideFormView<'a> {
    pub slide_id: Option<String>,
    pub active: bool,
    pub has_picture: bool,
    /// Submitted or stored values per language; `old_image` is the current image.
    pub translations: BTreeMap<i32, TranslationInput>,
    pub languages: &'a [Language],
    pub image_base_url: &'a str,
    pub action_url: String,
}

pub fn slide_form(view: &SlideFormView<'_>) -> String {
    let mut html = format!(
        r#"<form id="slide-form" method="post" action="{}" enctype="multipart/form-data" class="panel">
<h3>Slide information</h3>
"#,
        escape(&view.action_url)
    );

    let empty = TranslationInput::default();
    for language in view.languages {
        let id = language.id;
        let input = view.translations.get(&id).unwrap_or(&empty);
        html.push_str(&format!(
            r#"<fieldset class="translation" lang="{iso}">
  <legend>{iso}</legend>
"#,
            iso = escape(&language.iso_code)
        ));
        if !input.old_image.is_empty() {
            html.push_str(&format!(
                r#"  <img src="{base}{image}" class="img-thumbnail" alt="">
  <input type="hidden" name="image_old_{id}" value="{image}">
"#,
                base = escape(view.image_base_url),
                image = escape(&input.old_image),
                id = id,
            ));
        }
        html.push_str(&format!(
            r#"  <div class="form-group"><label>Image</label><input type="file" name="image_{id}" accept=".jpg,.jpeg,.png,.gif"></div>
  <div class="form-group"><label>Title</label><input type="text" name="title_{id}" value="{title}"></div>
  <div class="form-group"><label>Target URL</label><input type="text" name="url_{id}" value="{url}"></div>
  <div class="form-group"><label>Caption</label><input type="text" name="legend_{id}" value="{caption}"></div>
  <div class="form-group"><label>Description</label><textarea name="description_{id}" class="rte">{description}</textarea></div>
</fieldset>
"#,
            id = id,
            title = escape(&input.title),
            url = escape(&input.url),
            caption = escape(&input.caption),
            description = escape(&input.description),
        ));
    }

    html.push_str(&switch("active_slide", "Enabled", view.active, ""));
    if let Some(slide_id) = &view.slide_id {
        html.push_str(&format!(
            "<input type=\"hidden\" name=\"id_slide\" value=\"{}\">\n",
            escape(slide_id)
        ));
    }
    if view.has_picture {
        html.push_str("<input type=\"hidden\" name=\"has_picture\" value=\"1\">\n");
    }
    html.push_str(
        r#"<button type="submit" name="submitSlide" value="1" class="btn btn-primary">Save</button>
</form>
"#,
    );
    html
}

/// Enabled/Disabled toggle for one slide, submitted as a form.
fn status_toggle(slide_id: i64, active: bool, action_url: &str) -> String {
    let (title, class) = if active {
        ("Enabled", "btn-success")
    } else {
        ("Disabled", "btn-danger")
    };
    format!(
        r#"<form method="post" action="{action}" enctype="multipart/form-data" class="inline"><input type="hidden" name="id_slide" value="{id}"><button type="submit" name="changeStatus" value="1" class="btn {class}" title="{title}">{title}</button></form>"#,
        action = escape(action_url),
        id = slide_id,
        class = class,
        title = title,
    )
}

/// Sortable slide list with edit, delete and status controls.
pub fn slide_list(slides: &[SlideView], action_url: &str, reorder_url: &str) -> String {
    let action = escape(action_url);
    let mut html = format!(
        r#"<div class="panel">
<h3>Slides list <a href="{action}&amp;addSlide" class="btn btn-default">Add new</a></h3>
<ul id="slides" data-reorder-url="{reorder}">
"#,
        action = action,
        reorder = escape(reorder_url),
    );

    for slide in slides {
        html.push_str(&format!(
            r#"<li id="slides_{id}" data-id="{id}">
  <span class="position">#{id}</span>
  <img src="{image_url}" alt="">
  <span class="title">{title}</span>
"#,
            id = slide.id,
            image_url = escape(&slide.image_url),
            title = escape(&slide.title),
        ));
        if slide.is_shared {
            html.push_str("  <span class=\"label label-warning\">Shared slide</span>\n");
        }
        html.push_str(&format!(
            r#"  {status}
  <a href="{action}&amp;id_slide={id}" class="btn btn-default">Edit</a>
  <form method="post" action="{action}" enctype="multipart/form-data" class="inline"><button type="submit" name="delete_id_slide" value="{id}" class="btn btn-default">Delete</button></form>
</li>
"#,
            status = status_toggle(slide.id, slide.active, action_url),
            action = action,
            id = slide.id,
        ));
    }

    html.push_str(&format!(
        "</ul>\n</div>\n<script src=\"{}js/slider_admin.js\" defer></script>\n",
        ASSET_BASE
    ));
    html
}

/// Wraps admin fragments into a full document.
pub fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Image slider</title>
<link rel="stylesheet" href="{assets}css/image_slider.css">
</head>
<body>
<div id="image-slider-admin">
{body}
</div>
</body>
</html>
"#,
        assets = ASSET_BASE,
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Shop;

    fn languages() -> Vec<Language> {
        vec![
            Language {
                id: 1,
                iso_code: "en".into(),
                is_rtl: false,
            },
            Language {
                id: 2,
                iso_code: "fr".into(),
                is_rtl: false,
            },
        ]
    }

    fn view(slide_id: i64, active: bool, shared: bool) -> SlideView {
        SlideView {
            id: slide_id,
            position: 1,
            active,
            title: format!("Slide <{}>", slide_id),
            caption: String::new(),
            description: String::new(),
            url: String::new(),
            image: "a.png".into(),
            image_url: "/media/slider/a.png".into(),
            is_shared: shared,
        }
    }

    #[test]
    fn test_alert_escapes_and_joins() {
        let html = alert(
            AlertKind::Danger,
            &["The title is too long.".into(), "<b>x</b>".into()],
        );
        assert_eq!(
            html,
            r#"<div class="alert alert-danger">The title is too long.<br />&lt;b&gt;x&lt;/b&gt;</div>"#
        );
    }

    #[test]
    fn test_edit_context_error_lists_shops() {
        let html = edit_context_error(&["Main".into(), "Outlet".into()]);
        assert!(html.contains("shop(s) context: Main<br/>Outlet"));
    }

    #[test]
    fn test_scope_info() {
        let single = ShopDirectory::new(vec![Shop {
            id: 1,
            group_id: 1,
            name: "Main".into(),
            base_url: "https://main.example/".into(),
        }]);
        assert_eq!(scope_info(&single, ShopContext::Shop(1)), None);

        let multi = ShopDirectory::new(vec![
            Shop {
                id: 1,
                group_id: 1,
                name: "Main".into(),
                base_url: "https://main.example/".into(),
            },
            Shop {
                id: 2,
                group_id: 3,
                name: "Outlet".into(),
                base_url: "https://outlet.example/".into(),
            },
        ]);
        assert!(scope_info(&multi, ShopContext::Shop(2))
            .unwrap()
            .contains("applied to shop: Outlet"));
        assert!(scope_info(&multi, ShopContext::Group(3))
            .unwrap()
            .contains("applied to this group: 3"));
        assert!(scope_info(&multi, ShopContext::All)
            .unwrap()
            .contains("all shops and shop groups"));
    }

    #[test]
    fn test_confirmation_messages() {
        assert_eq!(confirmation_message(3), Some("Successful creation."));
        assert!(confirmation_message(6).is_some());
        assert_eq!(confirmation_message(2), None);
    }

    #[test]
    fn test_settings_form_checks_current_values() {
        let html = settings_form(
            &SettingsFormValues {
                speed: "4000".into(),
                pause_on_hover: false,
                wrap: true,
            },
            "/admin/slider?shop_context=s-1",
        );
        assert!(html.contains(r#"name="SPEED" value="4000""#));
        assert!(html.contains(r#"name="PAUSE_ON_HOVER" value="0" checked"#));
        assert!(html.contains(r#"name="WRAP" value="1" checked"#));
        assert!(html.contains(r#"name="submitSettings""#));
    }

    #[test]
    fn test_slide_form_edit_mode() {
        let languages = languages();
        let mut translations = BTreeMap::new();
        translations.insert(
            1,
            TranslationInput {
                title: "Hello \"world\"".into(),
                old_image: "abc_en.png".into(),
                ..Default::default()
            },
        );
        let html = slide_form(&SlideFormView {
            slide_id: Some("7".into()),
            active: true,
            has_picture: true,
            translations,
            languages: &languages,
            image_base_url: "/media/slider/",
            action_url: "/admin/slider?shop_context=s-1".into(),
        });

        assert!(html.contains(r#"name="title_1" value="Hello &quot;world&quot;""#));
        assert!(html.contains(r#"name="image_old_1" value="abc_en.png""#));
        assert!(!html.contains("image_old_2"));
        assert!(html.contains(r#"name="image_2""#));
        assert!(html.contains(r#"name="id_slide" value="7""#));
        assert!(html.contains(r#"name="has_picture""#));
        assert!(html.contains(r#"name="active_slide" value="1" checked"#));
    }

    #[test]
    fn test_slide_form_add_mode() {
        let languages = languages();
        let html = slide_form(&SlideFormView {
            slide_id: None,
            active: false,
            has_picture: false,
            translations: BTreeMap::new(),
            languages: &languages,
            image_base_url: "/media/slider/",
            action_url: "/admin/slider".into(),
        });
        assert!(!html.contains("id_slide"));
        assert!(!html.contains("has_picture"));
        assert!(html.contains(r#"name="title_2" value="""#));
    }

    #[test]
    fn test_slide_list_controls() {
        let html = slide_list(
            &[view(1, true, false), view(2, false, true)],
            "/admin/slider?shop_context=s-1",
            "/modules/image-slider/ajax?secure_key=k",
        );
        assert!(html.contains(r#"data-reorder-url="/modules/image-slider/ajax?secure_key=k""#));
        assert!(html.contains(r#"<li id="slides_1" data-id="1">"#));
        assert!(html.contains("Slide &lt;1&gt;"));
        assert!(html.contains(r#"class="btn btn-success" title="Enabled""#));
        assert!(html.contains(r#"class="btn btn-danger" title="Disabled""#));
        assert_eq!(html.matches("Shared slide").count(), 1);
        assert!(html.contains(r#"href="/admin/slider?shop_context=s-1&amp;id_slide=2""#));
        assert!(html.contains(r#"name="delete_id_slide" value="2""#));
    }
}
