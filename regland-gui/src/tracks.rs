//! Genome track, heatmap, and expression rendering.

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use regland_api::ExpressionPoint;
use regland_core::bins::ConservationMatrix;
use regland_core::track::{TrackItem, TrackLayout};
use regland_core::types::ConservationClass;
use regland_core::view::{GeneViewport, WheelDirection};

pub const TRACK_HEIGHT: f32 = 96.0;

/// Enhancer class colour scheme shared by tracks and the heatmap legend.
pub fn class_color(class: ConservationClass) -> Color32 {
    match class {
        ConservationClass::Conserved => Color32::from_rgb(0x31, 0xc0, 0x6a),
        ConservationClass::Gained => Color32::from_rgb(0xff, 0xcf, 0x33),
        ConservationClass::Lost => Color32::from_rgb(0x8f, 0x9a, 0xa7),
        ConservationClass::HumanSpecific => Color32::from_rgb(0xd9, 0x6a, 0xe0),
        ConservationClass::Unlabeled => Color32::from_rgb(0x4e, 0xa4, 0xff),
    }
}

fn class_color_by_label(label: Option<&'static str>) -> Color32 {
    match label {
        Some("conserved") => class_color(ConservationClass::Conserved),
        Some("gained") => class_color(ConservationClass::Gained),
        Some("lost") => class_color(ConservationClass::Lost),
        Some("human_specific") => class_color(ConservationClass::HumanSpecific),
        _ => class_color(ConservationClass::Unlabeled),
    }
}

/// Draws one species track. Returns a wheel-zoom request when the user
/// scrolled over the track with Ctrl/Cmd held.
pub fn species_track(
    ui: &mut egui::Ui,
    layout: &TrackLayout,
    viewport: &GeneViewport,
) -> Option<(f64, WheelDirection)> {
    let width = ui.available_width();
    let (response, painter) =
        ui.allocate_painter(Vec2::new(width, TRACK_HEIGHT), Sense::hover());
    let rect = response.rect;

    painter.rect_filled(rect, 4.0, ui.visuals().extreme_bg_color);

    let x_at = |pct: f64| -> f32 {
        rect.left() + rect.width() * (pct / 100.0).clamp(0.0, 1.0) as f32
    };
    let span = |item: &TrackItem, top: f32, height: f32| -> Rect {
        let left = x_at(item.start_pct);
        let right = x_at(item.end_pct).max(left + 2.0);
        Rect::from_min_max(Pos2::new(left, top), Pos2::new(right, top + height))
    };

    let gene_row = rect.top() + 12.0;
    let enh_row = rect.top() + 36.0;
    let ctcf_row = rect.top() + 56.0;
    let snp_row = rect.top() + 78.0;

    let mut hovered: Option<&TrackItem> = None;
    let pointer = response.hover_pos();
    // last hit wins, which matches draw order
    let hit = |item_rect: Rect| match pointer {
        Some(p) => item_rect.expand(2.0).contains(p),
        None => false,
    };

    if let Some(body) = &layout.gene_body {
        let r = span(body, gene_row, 12.0);
        painter.rect_filled(r, 3.0, Color32::from_rgb(0x5a, 0x6f, 0x8f));
        if hit(r) {
            hovered = Some(body);
        }
    }
    if let Some(tss_pct) = layout.tss_pct {
        let x = x_at(tss_pct);
        painter.line_segment(
            [Pos2::new(x, rect.top() + 4.0), Pos2::new(x, rect.bottom() - 4.0)],
            Stroke::new(1.0, Color32::from_rgb(0xe0, 0x62, 0x3c)),
        );
    }

    for item in &layout.enhancers {
        let r = span(item, enh_row, 12.0);
        painter.rect_filled(r, 2.0, class_color_by_label(item.class_label));
        if hit(r) {
            hovered = Some(item);
        }
    }

    for item in &layout.ctcf_sites {
        let r = span(item, ctcf_row, 10.0);
        painter.rect_stroke(r, 2.0, Stroke::new(1.5, Color32::from_rgb(0x8a, 0x63, 0xd2)));
        if hit(r) {
            hovered = Some(item);
        }
    }

    for item in &layout.snps {
        let x = x_at(item.start_pct);
        let center = Pos2::new(x, snp_row + 5.0);
        painter.circle_filled(center, 3.5, Color32::from_rgb(0xd6, 0x45, 0x45));
        let r = Rect::from_center_size(center, Vec2::splat(8.0));
        if hit(r) {
            hovered = Some(item);
        }
    }

    // bp scale labels for the visible window
    let (view_left, view_right) = viewport.abs_view_range();
    let font = FontId::proportional(10.0);
    let label_color = ui.visuals().weak_text_color();
    painter.text(
        Pos2::new(rect.left() + 4.0, rect.bottom() - 2.0),
        Align2::LEFT_BOTTOM,
        format!("{}", view_left.round() as u64),
        font.clone(),
        label_color,
    );
    painter.text(
        Pos2::new(rect.right() - 4.0, rect.bottom() - 2.0),
        Align2::RIGHT_BOTTOM,
        format!("{}", view_right.round() as u64),
        font,
        label_color,
    );

    if let Some(item) = hovered {
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            response.layer_id,
            response.id.with("track_tooltip"),
            |ui| {
                ui.label(item.tooltip.clone());
            },
        );
    }

    // Ctrl/Cmd + wheel zooms at the cursor; plain scrolling is left alone.
    if response.hovered() {
        let (zoom_mod, scroll_y) = ui.input(|i| (i.modifiers.command, i.raw_scroll_delta.y));
        if zoom_mod && scroll_y != 0.0 {
            if let Some(p) = pointer {
                let ratio = ((p.x - rect.left()) / rect.width()).clamp(0.0, 1.0) as f64;
                let direction = if scroll_y > 0.0 {
                    WheelDirection::In
                } else {
                    WheelDirection::Out
                };
                return Some((ratio, direction));
            }
        }
    }
    None
}

/// Track legend shared by every species panel.
pub fn class_legend(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        for class in ConservationClass::ALL {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), Sense::hover());
            ui.painter().rect_filled(rect, 2.0, class_color(class));
            ui.label(class.label());
            ui.add_space(8.0);
        }
    });
}

/// Single-row density strip of the conserved-enhancer bins (values 0-100).
pub fn conservation_strip(ui: &mut egui::Ui, bins: &[u32]) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(Vec2::new(width, 26.0), Sense::hover());
    let rect = response.rect;
    painter.rect_filled(rect, 2.0, ui.visuals().extreme_bg_color);
    if bins.is_empty() {
        return;
    }
    let bin_w = rect.width() / bins.len() as f32;
    let base = class_color(ConservationClass::Conserved);
    for (i, &value) in bins.iter().enumerate() {
        if value == 0 {
            continue;
        }
        let alpha = (value as f32 / 100.0 * 255.0).round() as u8;
        let color =
            Color32::from_rgba_unmultiplied(base.r(), base.g(), base.b(), alpha.max(20));
        let left = rect.left() + bin_w * i as f32;
        painter.rect_filled(
            Rect::from_min_max(
                Pos2::new(left, rect.top() + 2.0),
                Pos2::new(left + bin_w, rect.bottom() - 2.0),
            ),
            0.0,
            color,
        );
    }
}

/// Per-class heatmap rows of the conservation matrix.
pub fn conservation_matrix(ui: &mut egui::Ui, matrix: &ConservationMatrix) {
    let max = matrix.max_value().max(1.0);
    for (class, row) in matrix.classes.iter().zip(&matrix.rows) {
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 18.0], egui::Label::new(class.label()));
            let width = ui.available_width();
            let (response, painter) =
                ui.allocate_painter(Vec2::new(width, 18.0), Sense::hover());
            let rect = response.rect;
            painter.rect_filled(rect, 2.0, ui.visuals().extreme_bg_color);
            if row.is_empty() {
                return;
            }
            let bin_w = rect.width() / row.len() as f32;
            let base = class_color(*class);
            for (i, &value) in row.iter().enumerate() {
                if value <= 0.0 {
                    continue;
                }
                let frac = if matrix.normalized {
                    value
                } else {
                    value / max
                } as f32;
                let alpha = (frac.clamp(0.0, 1.0) * 255.0).round() as u8;
                let color = Color32::from_rgba_unmultiplied(
                    base.r(),
                    base.g(),
                    base.b(),
                    alpha.max(20),
                );
                let left = rect.left() + bin_w * i as f32;
                painter.rect_filled(
                    Rect::from_min_max(
                        Pos2::new(left, rect.top() + 1.0),
                        Pos2::new(left + bin_w, rect.bottom() - 1.0),
                    ),
                    0.0,
                    color,
                );
            }
        });
    }
}

/// Expression-by-tissue bar list, scaled against the highest TPM.
pub fn expression_bars(ui: &mut egui::Ui, points: &[ExpressionPoint]) {
    if points.is_empty() {
        ui.label("No expression data for this gene.");
        return;
    }
    let max_tpm = points.iter().map(|p| p.tpm).fold(0.0f64, f64::max).max(1e-9);
    let mut sorted: Vec<&ExpressionPoint> = points.iter().collect();
    sorted.sort_by(|a, b| b.tpm.total_cmp(&a.tpm));
    for point in sorted {
        let frac = (point.tpm / max_tpm) as f32;
        ui.add(
            egui::ProgressBar::new(frac)
                .text(format!("{}  {:.2} TPM", point.tissue, point.tpm)),
        );
    }
}
