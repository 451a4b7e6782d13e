//! Plain-text output

use std::fmt::Write;

use application::RouteInfo;
use domain::{NormalizedDailyForecast, WeatherAlert};

/// Render a forecast with its data-source label
pub fn forecast(forecast: &NormalizedDailyForecast) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🌦️  Forecast for {:.4}, {:.4}",
        forecast.latitude, forecast.longitude
    );
    let _ = writeln!(out, "   Source: {}", forecast.data_source());
    out.push('\n');

    for period in forecast.iter() {
        let _ = writeln!(
            out,
            "{}  {:>6.1}°C  {:>3}%  {:>5.1} km/h {:<3}  {}",
            period.timestamp.format("%a %d %b %H:%M"),
            period.temperature,
            period.precipitation_probability,
            period.wind_speed_kmh,
            period.wind_direction,
            period.description,
        );
    }

    if !forecast.alerts.is_empty() {
        out.push('\n');
        out.push_str(&alerts(&forecast.alerts));
    }
    out
}

/// Render an alert list
pub fn alerts(alerts: &[WeatherAlert]) -> String {
    if alerts.is_empty() {
        return "✅ No active alerts\n".to_string();
    }

    let mut out = String::new();
    for alert in alerts {
        let _ = writeln!(out, "⚠️  [{}] {}", alert.severity, alert.event);
        if !alert.headline.is_empty() && alert.headline != alert.event {
            let _ = writeln!(out, "   {}", alert.headline);
        }
        if let Some(expires) = alert.expires {
            let _ = writeln!(out, "   Expires: {}", expires.format("%Y-%m-%d %H:%M UTC"));
        }
    }
    out
}

/// Render the routing table
pub fn routes(routes: &[RouteInfo]) -> String {
    let mut out = String::from("📡 Provider routing:\n");
    for route in routes {
        let country = route
            .country
            .as_ref()
            .map_or("*", |country| country.as_str());
        let kind = if route.native {
            "native, falls back to Open-Meteo"
        } else {
            "no fallback"
        };
        let _ = writeln!(
            out,
            "   {country:<3} {:<28} {:<24} ({kind})",
            route.provider_name, route.provider_id
        );
    }
    out
}
