use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use eframe::{egui, App, CreationContext, Frame};
use egui::{Align, Color32, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use tracing::{debug, warn};

use crate::cadence::{parse_cadence, CadenceCoach, DEFAULT_DOWN_SECS, DEFAULT_REPS, DEFAULT_UP_SECS};
use crate::config::Config;
use crate::cues::{deliver, CueOptions, CueSink, DesktopCues};
use crate::error::Result;
use crate::export::{write_export, LIFT_LOG_FILE, WEIGH_IN_FILE};
use crate::form::{ChecklistForm, SetForm};
use crate::models::{format_result, DayTag, Units};
use crate::storage::FileStore;
use crate::tracker::Tracker;

const TOAST_MS: i64 = 2_500;

pub fn today_iso() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(PartialEq, Clone, Copy)]
enum Tab {
    Plan,
    Entry,
    Nutrition,
    Growth,
}

#[derive(PartialEq, Clone, Copy)]
enum Confirm {
    ClearLog,
    ClearWeighIns,
    ResetDaily,
}

impl Confirm {
    fn prompt(self) -> &'static str {
        match self {
            Confirm::ClearLog => "Clear the entire LIFT log? This cannot be undone.",
            Confirm::ClearWeighIns => "Clear the entire WEIGH-IN log? This cannot be undone.",
            Confirm::ResetDaily => "Reset today's checklist?",
        }
    }
}

struct Toast {
    text: String,
    shown_at: DateTime<Local>,
}

pub struct TrackerApp {
    tracker: Tracker<FileStore>,
    config: Config,
    tab: Tab,
    form: SetForm,
    plan_day: DayTag,
    search: String,
    nutrition: ChecklistForm,
    weigh_date: String,
    weigh_value: String,
    weigh_note: String,
    coach: CadenceCoach,
    cadence_down: String,
    cadence_up: String,
    cadence_reps: String,
    cue_options: CueOptions,
    cues: DesktopCues,
    last_cue: String,
    show_settings: bool,
    confirm: Option<Confirm>,
    toast: Option<Toast>,
}

impl TrackerApp {
    pub fn new(_cc: &CreationContext, tracker: Tracker<FileStore>, config: Config) -> Self {
        let today = today_iso();
        let form = SetForm::new(&tracker, &today);
        let nutrition = ChecklistForm::new(&tracker, &today);
        TrackerApp {
            plan_day: form.day,
            form,
            tracker,
            config,
            tab: Tab::Entry,
            search: String::new(),
            nutrition,
            weigh_date: today,
            weigh_value: String::new(),
            weigh_note: String::new(),
            coach: CadenceCoach::new(),
            cadence_down: DEFAULT_DOWN_SECS.to_string(),
            cadence_up: DEFAULT_UP_SECS.to_string(),
            cadence_reps: DEFAULT_REPS.to_string(),
            cue_options: CueOptions::default(),
            cues: DesktopCues::new(),
            last_cue: String::new(),
            show_settings: false,
            confirm: None,
            toast: None,
        }
    }

    fn toast(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast { text: text.into(), shown_at: Local::now() });
    }

    /// Toasts the outcome of an action: `ok` on success, the error otherwise.
    fn report<T>(&mut self, result: Result<T>, ok: impl FnOnce(T) -> String) {
        match result {
            Ok(value) => {
                let text = ok(value);
                self.toast(text);
            }
            Err(e) => {
                debug!(error = %e, "action rejected");
                self.toast(e.to_string());
            }
        }
    }

    fn drive_cadence(&mut self, ctx: &egui::Context, now: DateTime<Local>) {
        if !self.coach.is_running() {
            return;
        }
        for cue in self.coach.poll(now) {
            deliver(&mut self.cues, &cue, self.cue_options);
            self.last_cue = cue.text;
        }
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

impl App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        let now = Local::now();
        self.nutrition.refresh(&self.tracker, now, &today_iso());
        self.drive_cadence(ctx, now);

        let mut style = (*ctx.style()).clone();
        style.text_styles.insert(
            egui::TextStyle::Body,
            egui::FontId::new(18.0, egui::FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Heading,
            egui::FontId::new(26.0, egui::FontFamily::Proportional),
        );
        ctx.set_style(style);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Heavy Duty").heading().strong());
                ui.add_space(20.0);
                ui.label(
                    RichText::new(format!("Next: Day {}", self.tracker.next_day()))
                        .color(Color32::LIGHT_BLUE),
                );
                ui.label(
                    RichText::new(self.tracker.nutrition_summary(&today_iso()))
                        .color(Color32::LIGHT_GREEN),
                );
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (Tab::Plan, "Plan"),
                    (Tab::Entry, "Entry"),
                    (Tab::Nutrition, "Nutrition"),
                    (Tab::Growth, "Growth"),
                ] {
                    if ui.selectable_label(self.tab == tab, label).clicked() {
                        self.tab = tab;
                    }
                }
            });
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("toast").show(ctx, |ui| {
            let text = self.toast.as_ref().map(|t| t.text.as_str()).unwrap_or("");
            ui.label(RichText::new(text).italics());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| match self.tab {
                Tab::Plan => self.show_plan_tab(ui),
                Tab::Entry => self.show_entry_tab(ui),
                Tab::Nutrition => self.show_nutrition_tab(ui),
                Tab::Growth => self.show_growth_tab(ui),
            });
        });

        if self.show_settings {
            self.show_settings_window(ctx);
        }
        if let Some(confirm) = self.confirm {
            self.show_confirm_window(ctx, confirm);
        }

        if let Some(toast) = &self.toast {
            let expires = toast.shown_at + Duration::milliseconds(TOAST_MS);
            if now >= expires {
                self.toast = None;
            } else {
                ctx.request_repaint_after(std::time::Duration::from_millis(250));
            }
        }
        ctx.request_repaint_after(std::time::Duration::from_secs(30));
    }
}

impl TrackerApp {
    fn show_plan_tab(&mut self, ui: &mut Ui) {
        egui::ComboBox::from_id_salt("plan_day")
            .selected_text(format!("Day {}", self.plan_day))
            .show_ui(ui, |ui| {
                for day in DayTag::ALL {
                    ui.selectable_value(&mut self.plan_day, day, format!("Day {day}"));
                }
            });
        ui.add_space(10.0);

        let plan = self.tracker.plan();
        ui.label(RichText::new(format!("Plan - {}", plan.day(self.plan_day).title)).heading());
        ui.add_space(6.0);
        for (i, exercise) in plan.exercises(self.plan_day).iter().enumerate() {
            ui.horizontal(|ui| {
                ui.label(format!("{}.", i + 1));
                ui.label(RichText::new(exercise.as_str()).strong());
                if let Some(rule) = plan.rule_for(exercise) {
                    ui.label(RichText::new(rule.rep_range_label()).color(Color32::GRAY));
                }
            });
        }
    }

    fn show_entry_tab(&mut self, ui: &mut Ui) {
        let before_day = self.form.day;
        let before_exercise = self.form.exercise.clone();

        ui.horizontal(|ui| {
            ui.label("Day");
            egui::ComboBox::from_id_salt("entry_day")
                .selected_text(format!("Day {}", self.form.day))
                .show_ui(ui, |ui| {
                    for day in DayTag::ALL {
                        ui.selectable_value(&mut self.form.day, day, format!("Day {day}"));
                    }
                });
            ui.label("Exercise");
            egui::ComboBox::from_id_salt("entry_exercise")
                .width(320.0)
                .selected_text(self.form.exercise.clone())
                .show_ui(ui, |ui| {
                    for exercise in self.tracker.plan().exercises(self.form.day) {
                        ui.selectable_value(&mut self.form.exercise, exercise.clone(), exercise.as_str());
                    }
                });
        });

        if self.form.day != before_day {
            let day = self.form.day;
            self.form.select_day(&self.tracker, day);
            self.plan_day = day;
        } else if self.form.exercise != before_exercise {
            let exercise = self.form.exercise.clone();
            self.form.select_exercise(&self.tracker, &exercise);
        }

        ui.horizontal(|ui| {
            ui.label("Date");
            ui.add(egui::TextEdit::singleline(&mut self.form.date).desired_width(110.0));
            if ui.button("Today").clicked() {
                self.form.set_today(&today_iso());
                self.toast("Date set to today.");
            }
            ui.label("Units");
            egui::ComboBox::from_id_salt("entry_units")
                .selected_text(self.form.units.as_str())
                .show_ui(ui, |ui| {
                    for units in Units::ALL {
                        ui.selectable_value(&mut self.form.units, units, units.as_str());
                    }
                });
            ui.label("Weight");
            ui.add_enabled(
                self.form.units != Units::Bodyweight,
                egui::TextEdit::singleline(&mut self.form.weight).desired_width(70.0),
            );
            ui.label("Reps");
            ui.add(egui::TextEdit::singleline(&mut self.form.reps).desired_width(50.0));
            ui.checkbox(&mut self.form.clean, "Clean");
        });
        ui.horizontal(|ui| {
            ui.label("Notes");
            ui.add(egui::TextEdit::singleline(&mut self.form.notes).desired_width(400.0));
        });

        self.show_badges(ui);

        ui.horizontal(|ui| {
            if ui.button(RichText::new("Add set").strong()).clicked() {
                self.add_set();
            }
            if ui.button("Use last weight").clicked() {
                let result = self.form.use_last_weight(&self.tracker);
                self.report(result, |()| "Loaded last weight.".to_string());
            }
            if ui.button("Apply suggested").clicked() {
                let result = self.form.apply_suggested(&self.tracker);
                self.report(result, |()| "Applied suggested target.".to_string());
            }
            if ui.button("Quick-fill last").clicked() {
                let result = self.form.quick_fill_last(&self.tracker);
                self.report(result, |()| "Loaded last entry.".to_string());
            }
            if ui.button(RichText::new("Delete last").color(Color32::LIGHT_RED)).clicked() {
                self.delete_last();
            }
        });
        if !self.form.comparison.is_empty() {
            ui.label(RichText::new(&self.form.comparison).monospace());
        }

        ui.separator();
        self.show_cadence(ui);
        ui.separator();
        self.show_log(ui);
    }

    fn show_badges(&self, ui: &mut Ui) {
        let day = self.form.day;
        let exercise = &self.form.exercise;
        let last = self
            .tracker
            .last_for(day, exercise)
            .map_or_else(|| "—".to_string(), format_result);
        let range = self
            .tracker
            .rule_for(exercise)
            .map_or_else(|| "—".to_string(), |r| r.rep_range_label());
        let next = self
            .tracker
            .target_for(day, exercise)
            .map_or_else(|| "—".to_string(), |t| t.load_label());
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("Last: {last}")).color(Color32::GRAY));
            ui.label(RichText::new(format!("Target: {range}")).color(Color32::GRAY));
            ui.label(
                RichText::new(format!("Next (if clean max): {next}")).color(Color32::LIGHT_GREEN),
            );
        });
    }

    fn add_set(&mut self) {
        let set = match self.form.validate(&today_iso()) {
            Ok(set) => set,
            Err(e) => return self.toast(e.to_string()),
        };
        match self.tracker.add_set(set, now_ms()) {
            Ok(logged) => {
                self.form.reset_after_submit();
                self.form.auto_fill(&self.tracker);
                self.form.comparison = logged.comparison.to_string();
                match logged.suggested {
                    Some(target) => self.toast(format!("Saved next target: {}", target.load_label())),
                    None => self.toast("Saved."),
                }
            }
            Err(e) => {
                warn!(error = %e, "could not log set");
                self.toast(e.to_string());
            }
        }
    }

    fn delete_last(&mut self) {
        let result = self.tracker.delete_last();
        self.report(result, |removed| {
            format!("Deleted: Day {} - {}", removed.day, removed.exercise)
        });
    }

    fn show_cadence(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Cadence coach").strong());
        ui.horizontal(|ui| {
            ui.label("Down (s)");
            ui.add(egui::TextEdit::singleline(&mut self.cadence_down).desired_width(40.0));
            ui.label("Up (s)");
            ui.add(egui::TextEdit::singleline(&mut self.cadence_up).desired_width(40.0));
            ui.label("Reps");
            ui.add(egui::TextEdit::singleline(&mut self.cadence_reps).desired_width(40.0));
            ui.checkbox(&mut self.cue_options.voice, "Voice");
            ui.checkbox(&mut self.cue_options.beep, "Beep");
            ui.checkbox(&mut self.cue_options.vibrate, "Vibrate");
        });
        ui.horizontal(|ui| {
            if ui.button("Start").clicked() {
                match parse_cadence(&self.cadence_down, &self.cadence_up, &self.cadence_reps) {
                    Ok((down, up, reps)) => {
                        let cue = self.coach.start(down, up, reps, Local::now());
                        deliver(&mut self.cues, &cue, self.cue_options);
                        self.last_cue = cue.text;
                    }
                    Err(e) => self.toast(e.to_string()),
                }
            }
            if ui.button("Stop").clicked() {
                self.coach.stop();
                self.cues.cancel();
                self.last_cue.clear();
            }
            let color = if self.cues.pulsing(Local::now()) {
                Color32::YELLOW
            } else {
                Color32::LIGHT_BLUE
            };
            ui.label(RichText::new(self.coach.status()).monospace().color(color));
            if self.coach.is_running() && !self.last_cue.is_empty() {
                ui.label(RichText::new(&self.last_cue).strong());
            }
        });
    }

    fn show_log(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label("Search");
            ui.add(egui::TextEdit::singleline(&mut self.search).desired_width(220.0));
        });
        let entries = self.tracker.search(&self.search);
        ui.label(RichText::new(format!("{} entries", entries.len())).color(Color32::GRAY));

        if entries.is_empty() {
            ui.label(RichText::new("No entries yet. Add your first set.").color(Color32::GRAY));
            return;
        }

        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::auto().at_least(200.0))
            .column(Column::auto().at_least(120.0))
            .column(Column::remainder())
            .header(22.0, |mut header| {
                for title in ["Date", "Day", "Exercise", "Result", "Notes"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for entry in entries {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.monospace(entry.date.as_str());
                        });
                        row.col(|ui| {
                            ui.label(entry.day.as_str());
                        });
                        row.col(|ui| {
                            ui.label(entry.exercise.as_str());
                        });
                        row.col(|ui| {
                            let clean = if entry.clean { " ✅" } else { "" };
                            ui.monospace(format!("{}{clean}", format_result(entry)));
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(&entry.notes).color(Color32::GRAY));
                        });
                    });
                }
            });
    }

    fn show_nutrition_tab(&mut self, ui: &mut Ui) {
        ui.label(RichText::new(format!("Nutrition - {}", self.nutrition.date)).heading());
        ui.add_space(6.0);
        let c = &mut self.nutrition.checklist;
        ui.checkbox(&mut c.meal1, "Meal 1");
        ui.checkbox(&mut c.meal2, "Meal 2");
        ui.checkbox(&mut c.shake1, "Shake 1");
        ui.checkbox(&mut c.shake2, "Shake 2");
        ui.checkbox(&mut c.creatine, "Creatine");
        ui.checkbox(&mut c.water, "Water");
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                let result = self.nutrition.save(&mut self.tracker, now_ms());
                self.report(result, |_| "Saved nutrition for today.".to_string());
            }
            if ui.button("Reset").clicked() {
                self.confirm = Some(Confirm::ResetDaily);
            }
        });

        if let Some(saved_at) = self.tracker.daily_for(&self.nutrition.date).saved_at {
            if let Some(at) = Local.timestamp_millis_opt(saved_at).single() {
                ui.label(
                    RichText::new(format!("Saved: {}", at.format("%H:%M:%S"))).color(Color32::GRAY),
                );
            }
        }
    }

    fn show_growth_tab(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Weigh-ins").heading());
        ui.horizontal(|ui| {
            ui.label("Date");
            ui.add(egui::TextEdit::singleline(&mut self.weigh_date).desired_width(110.0));
            ui.label("Weight");
            ui.add(egui::TextEdit::singleline(&mut self.weigh_value).desired_width(70.0));
            ui.label("Note");
            ui.add(egui::TextEdit::singleline(&mut self.weigh_note).desired_width(220.0));
            if ui.button("Add").clicked() {
                let result = self.tracker.add_weigh_in(
                    &self.weigh_date,
                    &self.weigh_value,
                    &self.weigh_note,
                    &today_iso(),
                    now_ms(),
                );
                if result.is_ok() {
                    self.weigh_value.clear();
                    self.weigh_note.clear();
                }
                self.report(result, |_| "Weigh-in added.".to_string());
            }
        });
        ui.add_space(8.0);

        let weigh_ins = self.tracker.weigh_ins();
        if weigh_ins.is_empty() {
            ui.label(RichText::new("No weigh-ins yet.").color(Color32::GRAY));
            return;
        }

        let mut delete = None;
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(Column::auto().at_least(110.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::remainder())
            .column(Column::auto())
            .header(22.0, |mut header| {
                for title in ["Date", "Weight", "Note", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for w in weigh_ins {
                    body.row(24.0, |mut row| {
                        row.col(|ui| {
                            ui.monospace(w.date.as_str());
                        });
                        row.col(|ui| {
                            ui.monospace(w.weight.as_str());
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(&w.note).color(Color32::GRAY));
                        });
                        row.col(|ui| {
                            if ui.button(RichText::new("Delete").color(Color32::LIGHT_RED)).clicked() {
                                delete = Some(w.ts);
                            }
                        });
                    });
                }
            });

        if let Some(ts) = delete {
            if let Err(e) = self.tracker.delete_weigh_in(ts) {
                warn!(ts, error = %e, "could not delete weigh-in");
                self.toast(e.to_string());
            }
        }
    }

    fn show_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = true;
        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(
                    RichText::new(format!("Exports go to {}", self.config.export_dir.display()))
                        .color(Color32::GRAY),
                );
                if ui.button("Export lift log CSV").clicked() {
                    let result = self.tracker.export_lift_csv().and_then(|text| {
                        write_export(&self.config.export_dir, LIFT_LOG_FILE, &text)
                    });
                    self.report(result, |path| format!("Exported lift log CSV to {}.", path.display()));
                }
                if ui.button("Export weigh-ins CSV").clicked() {
                    let result = self.tracker.export_weigh_csv().and_then(|text| {
                        write_export(&self.config.export_dir, WEIGH_IN_FILE, &text)
                    });
                    self.report(result, |path| format!("Exported weigh-ins CSV to {}.", path.display()));
                }
                ui.separator();
                if ui.button(RichText::new("Clear lift log").color(Color32::LIGHT_RED)).clicked() {
                    self.confirm = Some(Confirm::ClearLog);
                }
                if ui.button(RichText::new("Clear weigh-ins").color(Color32::LIGHT_RED)).clicked() {
                    self.confirm = Some(Confirm::ClearWeighIns);
                }
            });
        if !open {
            self.show_settings = false;
        }
    }

    fn show_confirm_window(&mut self, ctx: &egui::Context, confirm: Confirm) {
        let mut decision = None;
        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(confirm.prompt());
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        decision = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        decision = Some(false);
                    }
                });
            });

        match decision {
            Some(true) => {
                self.confirm = None;
                self.apply_confirmed(confirm);
            }
            Some(false) => self.confirm = None,
            None => {}
        }
    }

    fn apply_confirmed(&mut self, confirm: Confirm) {
        match confirm {
            Confirm::ClearLog => {
                let result = self.tracker.clear_log();
                self.report(result, |()| "Lift log cleared.".to_string());
            }
            Confirm::ClearWeighIns => {
                let result = self.tracker.clear_weigh_ins();
                self.report(result, |()| "Weigh-ins cleared.".to_string());
            }
            Confirm::ResetDaily => {
                let result = self.nutrition.reset(&mut self.tracker);
                self.report(result, |()| "Reset.".to_string());
            }
        }
    }
}
