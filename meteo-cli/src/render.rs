use chrono::{DateTime, Local, Utc};
use meteo_core::{Config, MapView, RestoreReport, ViewState, Widget};
use std::fmt::Write;

pub const MAP_PLACEHOLDER: &str = "Добавьте виджеты погоды для отображения на карте";

pub fn widget_card(widget: &Widget) -> String {
    let data = &widget.data;
    let mut out = String::new();

    let _ = writeln!(out, "{} Погода  [{}]", data.icon(), widget.id);
    let _ = writeln!(
        out,
        "  Широта: {:.4}°  Долгота: {:.4}°",
        data.coordinates.latitude, data.coordinates.longitude
    );
    let _ = writeln!(out, "  {}°C  {}", data.temperature_c, data.description());
    let _ = writeln!(out, "  Ветер: {} км/ч, {}", data.wind_speed_kmh, data.wind_direction);
    let _ = writeln!(out, "  Местное время: {}", data.local_time);
    let _ = writeln!(out, "  Часовой пояс: {}", data.timezone);
    if let Some(at) = DateTime::from_timestamp_millis(data.observed_at_epoch_ms) {
        let _ = writeln!(
            out,
            "  Обновлено: {}",
            at.with_timezone(&Local).format("%d.%m.%Y %H:%M:%S")
        );
    }

    out
}

pub fn map_section(map: &MapView, embed_base_url: &str) -> String {
    let Some(frame) = map.frame() else {
        return MAP_PLACEHOLDER.to_string();
    };

    match frame.embed_url(embed_base_url) {
        Ok(url) => format!("Карта ({}): {url}", frame.center),
        Err(e) => {
            tracing::warn!(error = %e, base = embed_base_url, "invalid map embed URL");
            format!("Карта: {}", frame.center)
        }
    }
}

/// One-line label used in selection prompts.
pub fn widget_label(widget: &Widget) -> String {
    format!(
        "{} {}: {}°C, {}",
        widget.data.icon(),
        widget.data.coordinates,
        widget.data.temperature_c,
        widget.data.description()
    )
}

pub fn print_view(view: &ViewState, config: &Config) {
    if let Some(banner) = view.banner.as_ref().filter(|b| b.is_active(Utc::now())) {
        eprintln!("⚠ {}", banner.message);
    }

    if view.widgets.is_empty() {
        println!("Виджетов пока нет.");
    }
    for widget in &view.widgets {
        println!("{}", widget_card(widget));
    }

    println!("{}", map_section(&view.map, &config.map.embed_base_url));
}

pub fn print_restore_report(report: &RestoreReport) {
    for failure in &report.failures {
        eprintln!(
            "⚠ Не удалось восстановить виджет {}: {}",
            failure.coordinates,
            failure.error.user_message()
        );
    }
}
