//! Inline SVG Charts
//!
//! Just enough charting for the market view: a line for the evolution of
//! active companies, paired bars for entries vs exits, horizontal bars for
//! the per-state distribution.

use cnpj_insight_core::format::format_integer;
use cnpj_insight_core::market::{ChartSeries, EntriesExits};
use leptos::prelude::*;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 220.0;
const PAD: f64 = 28.0;

fn scale(value: i64, max: i64) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    (value.max(0) as f64 / max as f64) * (HEIGHT - 2.0 * PAD)
}

fn empty_chart() -> AnyView {
    view! { <div class="chart-empty">"Sem dados para o período"</div> }.into_any()
}

/// Polyline over evenly spaced points
#[component]
pub fn LineChart(#[prop(into)] series: Signal<ChartSeries>) -> impl IntoView {
    move || {
        let s = series.get();
        if s.is_empty() {
            return empty_chart();
        }
        let max = s.max();
        let step = if s.values.len() > 1 {
            (WIDTH - 2.0 * PAD) / (s.values.len() - 1) as f64
        } else {
            0.0
        };
        let points: Vec<(f64, f64, i64)> = s
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (PAD + i as f64 * step, HEIGHT - PAD - scale(*v, max), *v))
            .collect();
        let path = points
            .iter()
            .map(|(x, y, _)| format!("{:.1},{:.1}", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        let labels = s.labels.clone();

        view! {
            <svg class="chart line-chart" viewBox=format!("0 0 {} {}", WIDTH, HEIGHT)>
                <polyline class="chart-line" points=path fill="none" />
                {points.into_iter().enumerate().map(|(i, (x, y, v))| {
                    let label = labels.get(i).cloned().unwrap_or_default();
                    view! {
                        <circle class="chart-dot" cx=x cy=y r="3">
                            <title>{format!("{}: {}", label, format_integer(v))}</title>
                        </circle>
                        <text class="chart-label" x=x y={HEIGHT - 8.0} text-anchor="middle">{label}</text>
                    }
                }).collect_view()}
            </svg>
        }
        .into_any()
    }
}

/// Entries and exits side by side per month
#[component]
pub fn EntriesExitsChart(#[prop(into)] data: Signal<EntriesExits>) -> impl IntoView {
    move || {
        let d = data.get();
        if d.labels.is_empty() {
            return empty_chart();
        }
        let max = d.entries.iter().chain(d.exits.iter()).copied().max().unwrap_or(0);
        let slot = (WIDTH - 2.0 * PAD) / d.labels.len() as f64;
        let bar = (slot / 2.0 - 4.0).max(2.0);

        view! {
            <svg class="chart bar-chart" viewBox=format!("0 0 {} {}", WIDTH, HEIGHT)>
                {d.labels.iter().enumerate().map(|(i, label)| {
                    let entries = d.entries.get(i).copied().unwrap_or(0);
                    let exits = d.exits.get(i).copied().unwrap_or(0);
                    let x = PAD + i as f64 * slot;
                    let he = scale(entries, max);
                    let hx = scale(exits, max);
                    view! {
                        <rect class="bar entries" x=x y={HEIGHT - PAD - he} width=bar height=he>
                            <title>{format!("{} entradas: {}", label, format_integer(entries))}</title>
                        </rect>
                        <rect class="bar exits" x={x + bar + 2.0} y={HEIGHT - PAD - hx} width=bar height=hx>
                            <title>{format!("{} saídas: {}", label, format_integer(exits))}</title>
                        </rect>
                        <text class="chart-label" x={x + bar} y={HEIGHT - 8.0} text-anchor="middle">{label.clone()}</text>
                    }
                }).collect_view()}
            </svg>
        }
        .into_any()
    }
}

/// Horizontal bars, one row per label
#[component]
pub fn HorizontalBars(#[prop(into)] series: Signal<ChartSeries>) -> impl IntoView {
    move || {
        let s = series.get();
        if s.is_empty() {
            return empty_chart();
        }
        let max = s.max().max(1);
        view! {
            <div class="hbar-chart">
                {s.labels.into_iter().zip(s.values).map(|(label, value)| {
                    let pct = value.max(0) as f64 * 100.0 / max as f64;
                    view! {
                        <div class="hbar-row">
                            <span class="hbar-label">{label}</span>
                            <div class="hbar-track">
                                <div class="hbar-fill" style=format!("width: {:.1}%", pct)></div>
                            </div>
                            <span class="hbar-value">{format_integer(value)}</span>
                        </div>
                    }
                }).collect_view()}
            </div>
        }
        .into_any()
    }
}
