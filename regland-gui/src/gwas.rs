//! GWAS category / trait / SNP browsing tab.

use regland_api::{GwasCategory, GwasTrait, TraitSnp, TraitsRequest};

pub const PAGE_SIZE: usize = 20;

/// Fetches this tab needs the app to run; the app spawns them and feeds
/// the results back into this state.
#[derive(Debug, Clone)]
pub enum GwasRequest {
    LoadTraits(TraitsRequest),
    LoadSnps { trait_name: String },
}

#[derive(Default)]
pub struct GwasState {
    pub categories: Vec<GwasCategory>,
    pub selected_category: Option<String>,
    pub search: String,

    pub traits: Vec<GwasTrait>,
    pub traits_loading: bool,
    pub traits_error: Option<String>,

    pub selected_trait: Option<String>,
    pub snps: Vec<TraitSnp>,
    pub total_count: u64,
    pub snps_loading: bool,
    pub snps_error: Option<String>,
    pub page: usize,
}

impl GwasState {
    fn traits_request(&self) -> TraitsRequest {
        TraitsRequest {
            category: self.selected_category.clone(),
            search: if self.search.trim().is_empty() {
                None
            } else {
                Some(self.search.trim().to_string())
            },
            limit: Some(200),
        }
    }

    pub fn on_traits(&mut self, result: Result<Vec<GwasTrait>, String>) {
        self.traits_loading = false;
        match result {
            Ok(traits) => {
                self.traits = traits;
                self.traits_error = None;
            }
            Err(err) => self.traits_error = Some(err),
        }
    }

    pub fn on_snps(&mut self, trait_name: &str, result: Result<(Vec<TraitSnp>, u64), String>) {
        if self.selected_trait.as_deref() != Some(trait_name) {
            return; // user already moved on to another trait
        }
        self.snps_loading = false;
        match result {
            Ok((snps, total)) => {
                self.snps = snps;
                self.total_count = total;
                self.snps_error = None;
                self.page = 0;
            }
            Err(err) => self.snps_error = Some(err),
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) -> Option<GwasRequest> {
        let mut request = None;

        ui.horizontal(|ui| {
            let selected_label = self
                .selected_category
                .clone()
                .unwrap_or_else(|| "All categories".to_string());
            egui::ComboBox::from_label("Category")
                .selected_text(selected_label)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.selected_category.is_none(), "All categories")
                        .clicked()
                    {
                        self.selected_category = None;
                    }
                    for cat in &self.categories {
                        let checked = self.selected_category.as_deref() == Some(&cat.id);
                        if ui
                            .selectable_label(checked, format!("{} ({})", cat.name, cat.count))
                            .clicked()
                        {
                            self.selected_category = Some(cat.id.clone());
                        }
                    }
                });

            ui.add(
                egui::TextEdit::singleline(&mut self.search)
                    .hint_text("trait, rsID, or gene")
                    .desired_width(220.0),
            );
            if ui.button("Search traits").clicked() {
                self.traits_loading = true;
                request = Some(GwasRequest::LoadTraits(self.traits_request()));
            }
        });

        if let Some(err) = &self.traits_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
        if self.traits_loading {
            ui.spinner();
        }

        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("gwas_traits")
            .max_height(200.0)
            .show(ui, |ui| {
                egui::Grid::new("traits_grid").striped(true).show(ui, |ui| {
                    ui.strong("Trait");
                    ui.strong("SNPs");
                    ui.strong("Genes");
                    ui.strong("Min p-value");
                    ui.end_row();
                    for tr in &self.traits {
                        let selected = self.selected_trait.as_deref() == Some(&tr.trait_name);
                        if ui.selectable_label(selected, &tr.trait_name).clicked() {
                            self.selected_trait = Some(tr.trait_name.clone());
                            self.snps.clear();
                            self.snps_loading = true;
                            request = Some(GwasRequest::LoadSnps {
                                trait_name: tr.trait_name.clone(),
                            });
                        }
                        ui.label(tr.snp_count.to_string());
                        ui.label(tr.gene_count.to_string());
                        ui.label(
                            tr.min_pval
                                .map(|p| format!("{p:.2e}"))
                                .unwrap_or_else(|| "-".to_string()),
                        );
                        ui.end_row();
                    }
                });
            });

        if let Some(trait_name) = self.selected_trait.clone() {
            ui.separator();
            ui.heading(&trait_name);
            if let Some(err) = &self.snps_error {
                ui.colored_label(ui.visuals().error_fg_color, err);
            }
            if self.snps_loading {
                ui.spinner();
            } else {
                self.snp_table(ui);
            }
        }

        request
    }

    fn snp_table(&mut self, ui: &mut egui::Ui) {
        let pages = self.snps.len().div_ceil(PAGE_SIZE).max(1);
        self.page = self.page.min(pages - 1);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.page > 0, egui::Button::new("Prev"))
                .clicked()
            {
                self.page -= 1;
            }
            ui.label(format!(
                "Page {} of {} ({} SNPs)",
                self.page + 1,
                pages,
                self.total_count
            ));
            if ui
                .add_enabled(self.page + 1 < pages, egui::Button::new("Next"))
                .clicked()
            {
                self.page += 1;
            }
        });

        let start = self.page * PAGE_SIZE;
        let rows = self.snps.iter().skip(start).take(PAGE_SIZE);
        egui::Grid::new("trait_snps_grid").striped(true).show(ui, |ui| {
            ui.strong("rsID");
            ui.strong("Position");
            ui.strong("p-value");
            ui.strong("Category");
            ui.strong("Genes");
            ui.end_row();
            for row in rows {
                ui.label(&row.snp.rsid);
                ui.label(format!("{}:{}", row.snp.chrom, row.snp.pos));
                ui.label(
                    row.snp
                        .pval
                        .map(|p| format!("{p:.2e}"))
                        .unwrap_or_else(|| "-".to_string()),
                );
                ui.label(row.snp.category.as_deref().unwrap_or("-"));
                ui.label(row.associated_genes.as_deref().unwrap_or("-"));
                ui.end_row();
            }
        });
    }
}
