//! Gene Region Viewer composition root.
//!
//! Wires search and selection events to the view-state engine, runs the
//! per-gene fetch orchestration on a background tokio runtime, and renders
//! the species tracks, conservation heatmap, expression bars, and GWAS
//! browser. All completions arrive over a channel tagged with the load
//! generation so stale responses never overwrite the current selection.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use regland_api::{
    load_gene, ApiError, Debouncer, GeneDataApi, GeneLoad, GeneSummary, GwasCategory, GwasTrait,
    HttpClient, LoadError, LoadGeneration, Species, TraitSnp, SEARCH_DEBOUNCE,
};
use regland_core::bins::{conservation_bins, ConservationMatrix, DEFAULT_BIN_COUNT};
use regland_core::citation;
use regland_core::track::TrackLayout;
use regland_core::types::ConservationClass;
use regland_core::view::{GeneViewport, PanDirection, WheelDirection, MIN_ZOOM};

use crate::gwas::{GwasRequest, GwasState};
use crate::tracks;

/// Species whose gene record anchors the viewer coordinate frame.
const REFERENCE_SPECIES: &str = "human_hg38";

/// Half-window around the TSS requested from the region endpoint, in kb.
const TSS_KB: u32 = 100;

const RECENT_LIMIT: usize = 5;

/// Number of bins in the per-class conservation matrix.
const MATRIX_BINS: usize = 30;

/// Starter genes per tissue, offered before any search.
const PRESETS: &[(&str, &[&str])] = &[
    ("Brain", &["BDNF", "SCN1A", "GRIN2B", "DRD2", "APOE"]),
    ("Heart", &["TTN", "MYH6", "MYH7", "PLN", "KCNQ1"]),
    ("Liver", &["ALB", "APOB", "CYP3A4", "HNF4A", "PCSK9"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Tracks,
    Conservation,
    Expression,
    Gwas,
}

#[derive(Debug)]
enum LoadFailure {
    NotFound {
        query: String,
        suggestions: Vec<String>,
    },
    Failed(String),
}

enum AppMsg {
    Species(Result<Vec<Species>, String>),
    Search {
        query: String,
        result: Result<Vec<GeneSummary>, String>,
    },
    GeneLoaded {
        generation: u64,
        result: Box<Result<GeneLoad, LoadFailure>>,
    },
    GwasCategories(Result<Vec<GwasCategory>, String>),
    GwasTraits(Result<Vec<GwasTrait>, String>),
    TraitSnps {
        trait_name: String,
        result: Result<(Vec<TraitSnp>, u64), String>,
    },
}

/// Preferences surviving restarts via eframe storage.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
struct Prefs {
    dark_mode: bool,
    tissue: String,
    recent_genes: Vec<String>,
}

impl Default for Prefs {
    fn default() -> Self {
        Self {
            dark_mode: true,
            tissue: "Liver".to_string(),
            recent_genes: Vec::new(),
        }
    }
}

enum ViewAction {
    ZoomIn,
    ZoomOut,
    Reset,
    Pan(PanDirection),
    Wheel(f64, WheelDirection),
}

pub struct RegLandApp {
    runtime: tokio::runtime::Runtime,
    api: Arc<dyn GeneDataApi>,
    tx: Sender<AppMsg>,
    rx: Receiver<AppMsg>,
    generation: LoadGeneration,
    debouncer: Debouncer,

    prefs: Prefs,

    search_text: String,
    suggestions: Vec<GeneSummary>,
    search_error: Option<(String, Vec<String>)>,

    species: Vec<Species>,

    loading: bool,
    load: Option<GeneLoad>,
    load_error: Option<String>,
    viewport: Option<GeneViewport>,

    tab: Tab,
    normalize_rows: bool,
    gwas: GwasState,
}

fn fallback_species() -> Vec<Species> {
    vec![Species {
        id: REFERENCE_SPECIES.to_string(),
        name: "Human".to_string(),
        genome_build: Some("hg38".to_string()),
    }]
}

impl RegLandApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        api_base: String,
    ) -> Result<Self, std::io::Error> {
        let prefs: Prefs = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let (tx, rx) = mpsc::channel();
        let api: Arc<dyn GeneDataApi> = Arc::new(HttpClient::new(api_base));

        let app = Self {
            runtime,
            api,
            tx,
            rx,
            generation: LoadGeneration::default(),
            debouncer: Debouncer::new(),
            prefs,
            search_text: String::new(),
            suggestions: Vec::new(),
            search_error: None,
            species: Vec::new(),
            loading: false,
            load: None,
            load_error: None,
            viewport: None,
            tab: Tab::Tracks,
            normalize_rows: false,
            gwas: GwasState::default(),
        };

        app.fetch_species(cc.egui_ctx.clone());
        app.fetch_gwas_categories(cc.egui_ctx.clone());
        Ok(app)
    }

    fn fetch_species(&self, ctx: egui::Context) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.species().await.map_err(|e| e.to_string());
            let _ = tx.send(AppMsg::Species(result));
            ctx.request_repaint();
        });
    }

    fn fetch_gwas_categories(&self, ctx: egui::Context) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.gwas_categories().await.map_err(|e| e.to_string());
            let _ = tx.send(AppMsg::GwasCategories(result));
            ctx.request_repaint();
        });
    }

    fn schedule_search(&mut self, ctx: &egui::Context, query: String) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        self.debouncer
            .schedule(self.runtime.handle(), SEARCH_DEBOUNCE, async move {
                let result = api
                    .search_genes(&query, REFERENCE_SPECIES)
                    .await
                    .map_err(|e| e.to_string());
                let _ = tx.send(AppMsg::Search { query, result });
                ctx.request_repaint();
            });
    }

    /// Commits a gene selection: bumps the load generation (implicitly
    /// invalidating everything in flight) and starts the fan-out.
    fn commit_gene(&mut self, ctx: &egui::Context, symbol: &str) {
        let symbol = symbol.trim().to_string();
        if symbol.is_empty() {
            return;
        }
        self.debouncer.cancel();
        self.suggestions.clear();
        self.search_error = None;
        self.load_error = None;
        self.loading = true;

        let generation = self.generation.next();
        let species = if self.species.is_empty() {
            fallback_species()
        } else {
            self.species.clone()
        };
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        let tissue = self.prefs.tissue.clone();

        self.runtime.spawn(async move {
            let result = load_gene(
                api,
                &symbol,
                REFERENCE_SPECIES,
                &species,
                &tissue,
                TSS_KB,
                generation,
            )
            .await
            .map_err(|err| match err {
                LoadError::Api(ApiError::GeneNotFound { query, suggestions }) => {
                    LoadFailure::NotFound { query, suggestions }
                }
                other => LoadFailure::Failed(other.to_string()),
            });
            let _ = tx.send(AppMsg::GeneLoaded {
                generation,
                result: Box::new(result),
            });
            ctx.request_repaint();
        });
    }

    fn run_gwas_request(&mut self, ctx: &egui::Context, request: GwasRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let ctx = ctx.clone();
        match request {
            GwasRequest::LoadTraits(req) => {
                self.runtime.spawn(async move {
                    let result = api.gwas_traits(&req).await.map_err(|e| e.to_string());
                    let _ = tx.send(AppMsg::GwasTraits(result));
                    ctx.request_repaint();
                });
            }
            GwasRequest::LoadSnps { trait_name } => {
                self.runtime.spawn(async move {
                    let result = api
                        .trait_snps(&trait_name, None)
                        .await
                        .map(|r| (r.snps, r.total_count))
                        .map_err(|e| e.to_string());
                    let _ = tx.send(AppMsg::TraitSnps { trait_name, result });
                    ctx.request_repaint();
                });
            }
        }
    }

    fn handle_message(&mut self, msg: AppMsg) {
        match msg {
            AppMsg::Species(Ok(list)) => {
                self.species = if list.is_empty() {
                    fallback_species()
                } else {
                    list
                };
            }
            AppMsg::Species(Err(err)) => {
                log::warn!("species list fetch failed: {err}");
                self.species = fallback_species();
            }
            AppMsg::Search { query, result } => {
                // only apply results for what is still in the box
                if query != self.search_text.trim() {
                    return;
                }
                match result {
                    Ok(genes) => self.suggestions = genes,
                    Err(err) => log::warn!("gene search failed: {err}"),
                }
            }
            AppMsg::GeneLoaded { generation, result } => {
                if !self.generation.is_current(generation) {
                    log::debug!("dropping stale load (generation {generation})");
                    return;
                }
                self.loading = false;
                match *result {
                    Ok(load) => {
                        self.viewport = Some(GeneViewport::new(load.gene.body()));
                        self.remember_gene(&load.symbol);
                        self.search_text = load.symbol.clone();
                        self.load = Some(load);
                        self.load_error = None;
                    }
                    Err(LoadFailure::NotFound { query, suggestions }) => {
                        self.search_error = Some((query, suggestions));
                    }
                    Err(LoadFailure::Failed(message)) => {
                        self.load_error = Some(message);
                    }
                }
            }
            AppMsg::GwasCategories(Ok(categories)) => self.gwas.categories = categories,
            AppMsg::GwasCategories(Err(err)) => {
                log::warn!("GWAS category fetch failed: {err}");
            }
            AppMsg::GwasTraits(result) => self.gwas.on_traits(result),
            AppMsg::TraitSnps { trait_name, result } => self.gwas.on_snps(&trait_name, result),
        }
    }

    fn remember_gene(&mut self, symbol: &str) {
        self.prefs.recent_genes.retain(|g| g != symbol);
        self.prefs.recent_genes.insert(0, symbol.to_string());
        self.prefs.recent_genes.truncate(RECENT_LIMIT);
    }

    /// Keyboard bindings, suppressed while any text field has focus.
    fn collect_keyboard_actions(&self, ctx: &egui::Context) -> Vec<ViewAction> {
        let mut actions = Vec::new();
        if ctx.wants_keyboard_input() {
            return actions;
        }
        let zoomed_in = self
            .viewport
            .as_ref()
            .map(|vp| vp.zoom_level() > MIN_ZOOM)
            .unwrap_or(false);
        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowUp) {
                actions.push(ViewAction::ZoomIn);
            }
            if i.key_pressed(egui::Key::ArrowDown) {
                actions.push(ViewAction::ZoomOut);
            }
            if i.modifiers.command && i.key_pressed(egui::Key::Num0) {
                actions.push(ViewAction::Reset);
            }
            if zoomed_in {
                if i.key_pressed(egui::Key::ArrowLeft) {
                    actions.push(ViewAction::Pan(PanDirection::Left));
                }
                if i.key_pressed(egui::Key::ArrowRight) {
                    actions.push(ViewAction::Pan(PanDirection::Right));
                }
            }
        });
        actions
    }

    fn apply_view_actions(&mut self, actions: Vec<ViewAction>) {
        let Some(vp) = self.viewport.as_mut() else {
            return;
        };
        for action in actions {
            match action {
                ViewAction::ZoomIn => vp.zoom_in(),
                ViewAction::ZoomOut => vp.zoom_out(),
                ViewAction::Reset => vp.reset(),
                ViewAction::Pan(direction) => vp.pan(direction),
                ViewAction::Wheel(ratio, direction) => vp.zoom_at_cursor(ratio, direction),
            }
        }
    }

    fn header_ui(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let mut commit: Option<String> = None;

        ui.horizontal(|ui| {
            ui.heading("RegLand");
            ui.separator();

            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_text)
                    .hint_text("gene symbol, e.g. BDNF")
                    .desired_width(220.0),
            );
            if response.changed() {
                self.search_error = None;
                let query = self.search_text.trim().to_string();
                if query.len() >= 2 {
                    self.schedule_search(ctx, query);
                } else {
                    self.debouncer.cancel();
                    self.suggestions.clear();
                }
            }
            let committed = response.lost_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Go").clicked() || committed {
                commit = Some(self.search_text.clone());
            }

            egui::ComboBox::from_label("Tissue")
                .selected_text(self.prefs.tissue.clone())
                .show_ui(ui, |ui| {
                    for (tissue, _) in PRESETS {
                        if ui
                            .selectable_label(self.prefs.tissue == *tissue, *tissue)
                            .clicked()
                            && self.prefs.tissue != *tissue
                        {
                            self.prefs.tissue = tissue.to_string();
                            if self.load.is_some() {
                                commit = Some(self.search_text.clone());
                            }
                        }
                    }
                });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let icon = if self.prefs.dark_mode { "☀" } else { "🌙" };
                if ui.button(icon).on_hover_text("Toggle theme").clicked() {
                    self.prefs.dark_mode = !self.prefs.dark_mode;
                }
                if ui
                    .button("Copy citation")
                    .on_hover_text("Copy a BibTeX entry")
                    .clicked()
                {
                    ui.ctx().output_mut(|o| o.copied_text = citation::bibtex());
                }
            });
        });

        if !self.suggestions.is_empty() {
            let picks: Vec<String> =
                self.suggestions.iter().map(|g| g.symbol.clone()).collect();
            ui.horizontal_wrapped(|ui| {
                ui.label("Matches:");
                for symbol in picks {
                    if ui.small_button(&symbol).clicked() {
                        self.search_text = symbol.clone();
                        commit = Some(symbol);
                    }
                }
            });
        }

        if let Some((query, suggestions)) = self.search_error.clone() {
            ui.horizontal_wrapped(|ui| {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    format!("Gene '{query}' not found."),
                );
                if !suggestions.is_empty() {
                    ui.label("Did you mean:");
                    for symbol in suggestions {
                        if ui.small_button(&symbol).clicked() {
                            self.search_text = symbol.clone();
                            commit = Some(symbol);
                        }
                    }
                }
            });
        }

        if !self.prefs.recent_genes.is_empty() {
            let recents = self.prefs.recent_genes.clone();
            ui.horizontal_wrapped(|ui| {
                ui.weak("Recent:");
                for symbol in recents {
                    if ui.small_button(&symbol).clicked() {
                        self.search_text = symbol.clone();
                        commit = Some(symbol);
                    }
                }
            });
        }

        if let Some(symbol) = commit {
            self.commit_gene(ctx, &symbol);
        }
    }

    fn welcome_ui(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.add_space(24.0);
        ui.heading("Browse regulatory landscapes across species");
        ui.label("Search for a gene above, or start from a preset:");
        ui.add_space(8.0);
        let mut commit: Option<(String, String)> = None;
        for (tissue, genes) in PRESETS {
            ui.horizontal(|ui| {
                ui.strong(*tissue);
                for gene in *genes {
                    if ui.small_button(*gene).clicked() {
                        commit = Some((tissue.to_string(), gene.to_string()));
                    }
                }
            });
        }
        if let Some((tissue, gene)) = commit {
            self.prefs.tissue = tissue;
            self.search_text = gene.clone();
            self.commit_gene(ctx, &gene);
        }
    }

    fn quality_ui(&self, ui: &mut egui::Ui, load: &GeneLoad) {
        let Some(quality) = &load.quality else {
            return;
        };
        ui.horizontal(|ui| {
            ui.weak("Data quality:");
            ui.label(format!("tissue {:?}", quality.tissue_availability).to_lowercase());
            ui.label(format!("score {:?}", quality.score_availability).to_lowercase());
            ui.label(format!("{:.1}% conserved", quality.conservation_percent));
            if !quality.available_species.is_empty() {
                ui.weak(format!(
                    "({} species with data)",
                    quality.available_species.len()
                ));
            }
        });
    }

    fn tracks_tab(&mut self, ui: &mut egui::Ui) {
        let (Some(load), Some(viewport)) = (&self.load, &self.viewport) else {
            return;
        };
        let mut wheel: Option<(f64, WheelDirection)> = None;
        let mut reset = false;
        let mut zoom_in = false;
        let mut zoom_out = false;
        let mut pan: Option<PanDirection> = None;

        ui.horizontal(|ui| {
            if ui.button("−").on_hover_text("Zoom out (ArrowDown)").clicked() {
                zoom_out = true;
            }
            if ui.button("+").on_hover_text("Zoom in (ArrowUp)").clicked() {
                zoom_in = true;
            }
            if ui.button("Reset").on_hover_text("Ctrl/Cmd+0").clicked() {
                reset = true;
            }
            ui.label(format!("zoom ×{:.1}", viewport.zoom_level()));
            if viewport.zoom_level() > MIN_ZOOM {
                if ui.button("◀").clicked() {
                    pan = Some(PanDirection::Left);
                }
                if ui.button("▶").clicked() {
                    pan = Some(PanDirection::Right);
                }
            }
            if let Some(url) = load
                .species_data
                .get(REFERENCE_SPECIES)
                .and_then(|r| r.as_ref())
                .and_then(|r| r.ucsc_url.as_ref())
            {
                ui.hyperlink_to("View in UCSC", url);
            }
        });
        tracks::class_legend(ui);
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for sp in &self.species {
                ui.strong(&sp.name);
                match load.species_data.get(&sp.id).and_then(|r| r.as_ref()) {
                    Some(region) => {
                        let track_vp = if sp.id == REFERENCE_SPECIES {
                            viewport.clone()
                        } else {
                            viewport.rebase(region.gene.body())
                        };
                        let layout = TrackLayout::build(
                            &region.gene,
                            &region.enhancers,
                            &region.ctcf_sites,
                            &region.gwas_snps,
                            &track_vp,
                        );
                        if let Some(gesture) = tracks::species_track(ui, &layout, &track_vp) {
                            wheel = Some(gesture);
                        }
                    }
                    None => {
                        ui.weak(format!("No data available for {}", sp.name));
                    }
                }
                ui.add_space(6.0);
            }
        });

        let mut actions = Vec::new();
        if zoom_in {
            actions.push(ViewAction::ZoomIn);
        }
        if zoom_out {
            actions.push(ViewAction::ZoomOut);
        }
        if reset {
            actions.push(ViewAction::Reset);
        }
        if let Some(direction) = pan {
            actions.push(ViewAction::Pan(direction));
        }
        if let Some((ratio, direction)) = wheel {
            actions.push(ViewAction::Wheel(ratio, direction));
        }
        self.apply_view_actions(actions);
    }

    fn conservation_tab(&mut self, ui: &mut egui::Ui) {
        let Some(load) = &self.load else {
            return;
        };
        let Some(region) = load
            .species_data
            .get(REFERENCE_SPECIES)
            .and_then(|r| r.as_ref())
            .or_else(|| load.species_data.values().find_map(|r| r.as_ref()))
        else {
            ui.weak("No region data to bin.");
            return;
        };

        // Recomputed per render pass; the inputs are small and this keeps
        // the heatmap in sync with whatever region is on screen.
        let bins = conservation_bins(
            region.gene.start,
            region.gene.end,
            &region.enhancers,
            DEFAULT_BIN_COUNT,
        );
        ui.label("Conserved enhancer density across the region:");
        tracks::conservation_strip(ui, &bins);
        ui.add_space(12.0);

        ui.checkbox(&mut self.normalize_rows, "Normalize rows");
        let matrix = ConservationMatrix::build(
            region.gene.start,
            region.gene.end,
            &region.enhancers,
            &ConservationClass::ALL,
            MATRIX_BINS,
            self.normalize_rows,
        );
        tracks::conservation_matrix(ui, &matrix);
    }

    fn expression_tab(&mut self, ui: &mut egui::Ui) {
        let Some(load) = &self.load else {
            return;
        };
        match &load.expression {
            Some(points) => tracks::expression_bars(ui, points),
            None => {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    "Expression data could not be loaded for this gene.",
                );
            }
        }
    }
}

impl eframe::App for RegLandApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(if self.prefs.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        while let Ok(msg) = self.rx.try_recv() {
            self.handle_message(msg);
        }

        let actions = self.collect_keyboard_actions(ctx);
        self.apply_view_actions(actions);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.header_ui(ctx, ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = &self.load_error {
                ui.colored_label(
                    ui.visuals().error_fg_color,
                    format!("Failed to load gene data: {message}"),
                );
                ui.label("Try selecting the gene again.");
                ui.separator();
            }
            if self.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading gene data…");
                });
            }

            if self.load.is_none() {
                if !self.loading && self.load_error.is_none() {
                    self.welcome_ui(ctx, ui);
                }
                // GWAS browsing works without a selected gene
                ui.separator();
                ui.heading("GWAS catalogue");
                if let Some(request) = self.gwas.ui(ui) {
                    self.run_gwas_request(ctx, request);
                }
                return;
            }

            if let Some(load) = &self.load {
                ui.heading(format!(
                    "{} ({}:{}-{})",
                    load.symbol, load.gene.chrom, load.gene.gene_start, load.gene.gene_end
                ));
                self.quality_ui(ui, load);
            }

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Tracks, "Tracks");
                ui.selectable_value(&mut self.tab, Tab::Conservation, "Conservation");
                ui.selectable_value(&mut self.tab, Tab::Expression, "Expression");
                ui.selectable_value(&mut self.tab, Tab::Gwas, "GWAS");
            });
            ui.separator();

            match self.tab {
                Tab::Tracks => self.tracks_tab(ui),
                Tab::Conservation => self.conservation_tab(ui),
                Tab::Expression => self.expression_tab(ui),
                Tab::Gwas => {
                    if let Some(request) = self.gwas.ui(ui) {
                        self.run_gwas_request(ctx, request);
                    }
                }
            }
        });
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.prefs);
    }
}
