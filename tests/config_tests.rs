use artwork_gallery::config::{Configuration, RearmPolicy};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
catalog-path: "/srv/gallery/artworks.json"
images-path: "/srv/gallery/images"
bind-address: "127.0.0.1:8080"
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.catalog_path, PathBuf::from("/srv/gallery/artworks.json"));
    assert_eq!(cfg.images_path, PathBuf::from("/srv/gallery/images"));
    assert_eq!(
        cfg.bind_address,
        "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
    );
}

#[test]
fn defaults_match_observed_timings() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert_eq!(cfg.slideshow.interval(), Duration::from_millis(5000));
    assert_eq!(cfg.lightbox.grace(), Duration::from_millis(300));
    assert_eq!(cfg.slideshow.rearm, RearmPolicy::Length);
    assert_eq!(cfg.bind_address.port(), 5000);
    assert_eq!(cfg.catalog_path, PathBuf::from("artworks.json"));
    assert!(cfg.validated().is_ok());
}

#[test]
fn parse_slideshow_and_lightbox_options() {
    let yaml = r#"
slideshow:
  interval-ms: 8000
  rearm: contents
lightbox:
  grace-ms: 450
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let settings = cfg.gallery_settings();
    assert_eq!(settings.slideshow.interval(), Duration::from_secs(8));
    assert_eq!(settings.slideshow.rearm, RearmPolicy::Contents);
    assert_eq!(settings.lightbox.grace(), Duration::from_millis(450));
}

#[test]
fn parse_page_options_keeps_unset_defaults() {
    let yaml = r#"
page:
  title: "Galerie - Ivan Gauthier"
  description: "Peintures contemporaines"
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.page.title, "Galerie - Ivan Gauthier");
    assert_eq!(
        cfg.page.description.as_deref(),
        Some("Peintures contemporaines")
    );
    assert_eq!(cfg.page.tagline, "Artiste Contemporain");
}

#[test]
fn zero_interval_is_rejected() {
    let yaml = r#"
slideshow:
  interval-ms: 0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(err.to_string().contains("interval-ms"));
}

#[test]
fn zero_grace_is_allowed() {
    let yaml = r#"
lightbox:
  grace-ms: 0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_ok());
}

#[test]
fn unknown_rearm_policy_fails_to_parse() {
    let yaml = r#"
slideshow:
  rearm: always
"#;
    assert!(serde_yaml::from_str::<Configuration>(yaml).is_err());
}

#[test]
fn blank_title_is_rejected() {
    let yaml = r#"
page:
  title: "   "
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gallery.yaml");
    std::fs::write(&path, "catalog-path: other.json\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.catalog_path, PathBuf::from("other.json"));
    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}

#[test]
fn rearm_policy_displays_as_config_value() {
    for policy in [RearmPolicy::Length, RearmPolicy::Contents] {
        let yaml = format!("slideshow:\n  rearm: {policy}\n");
        let cfg: Configuration = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(cfg.slideshow.rearm, policy);
    }
}
