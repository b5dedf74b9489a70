use std::sync::Arc;

use aggregator_core::pages::register::REGISTERED_MESSAGE;
use aggregator_core::{
    excerpt, ApiClient, AppConfig, FeedsPage, LoginPage, Phase, Post, PostsPage, RegisterPage,
    Route, Status, ThemeConfig, User, UserFeedPage,
};
use eframe::egui::{self, Color32, RichText, Rounding, Stroke};
use tokio::runtime::Runtime;
use tracing::warn;

pub struct AppInit {
    pub runtime: Arc<Runtime>,
    pub api: ApiClient,
    pub config: AppConfig,
    pub initial_route: Route,
}

pub struct AggregatorApp {
    runtime: Arc<Runtime>,
    api: ApiClient,
    config: AppConfig,
    route: Route,
    user: Option<User>,
    posts: PostsPage,
    feeds: FeedsPage,
    user_feed: UserFeedPage,
    login: LoginPage,
    register: RegisterPage,
}

const WIDGET_ROUNDING: f32 = 3.0;

fn paint_widget(
    visuals: &mut egui::style::WidgetVisuals,
    fill: Color32,
    border: Color32,
    text: Color32,
) {
    visuals.bg_fill = fill;
    visuals.weak_bg_fill = fill;
    visuals.bg_stroke = Stroke::new(1.0, border);
    visuals.fg_stroke = Stroke::new(1.0, text);
    visuals.rounding = Rounding::same(WIDGET_ROUNDING);
}

/// Dark visuals driven entirely by the configured theme.
pub fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
    let theme: &ThemeConfig = &config.theme;
    let text = theme.text_color32();
    let border = theme.border_color32();
    let accent = theme.accent_color32();

    let mut style = (*ctx.style()).clone();
    let visuals = &mut style.visuals;
    visuals.dark_mode = true;
    visuals.panel_fill = theme.panel_color32();
    visuals.window_fill = theme.background_color32();
    visuals.extreme_bg_color = theme.input_color32();
    visuals.faint_bg_color = theme.faint_color32();
    visuals.override_text_color = Some(text);
    visuals.selection.bg_fill = accent.linear_multiply(0.25);
    visuals.selection.stroke = Stroke::new(1.0, accent);

    let widgets = &mut visuals.widgets;
    paint_widget(&mut widgets.noninteractive, theme.panel_color32(), border, text);
    paint_widget(&mut widgets.inactive, theme.widget_color32(), border, text);
    paint_widget(&mut widgets.hovered, theme.hover_color32(), accent, text);
    paint_widget(&mut widgets.active, accent, accent, Color32::WHITE);

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.window_margin = egui::Margin::same(10.0);
    style.spacing.interact_size = egui::vec2(36.0, 28.0);

    for font in style.text_styles.values_mut() {
        font.size = font.size.max(config.ui.font_size);
    }

    ctx.set_style(style);
}

/// HTML content flattened to text and cut to `max_chars`.
fn content_preview(content: &str, max_chars: usize) -> String {
    let text = html2text::from_read(content.as_bytes(), 100);
    let text = text.trim();
    let preview = excerpt(text, max_chars);
    if preview.len() < text.len() {
        format!("{preview}…")
    } else {
        preview.to_string()
    }
}

fn status_line(ui: &mut egui::Ui, theme: &ThemeConfig, status: Option<&Status>) {
    if let Some(status) = status {
        let color = if status.is_error() {
            theme.error_color32()
        } else {
            theme.success_color32()
        };
        ui.label(RichText::new(status.text()).color(color));
    }
}

impl AggregatorApp {
    pub fn new(init: AppInit) -> Self {
        let page_size = init.config.api.page_size;
        let probe_limit = init.config.api.subscription_probe_limit;
        let user = init.runtime.block_on(init.api.session().user());
        let mut app = Self {
            runtime: init.runtime,
            api: init.api,
            config: init.config,
            route: Route::Posts,
            user,
            posts: PostsPage::default(),
            feeds: FeedsPage::new(probe_limit),
            user_feed: UserFeedPage::new(page_size),
            login: LoginPage::default(),
            register: RegisterPage::default(),
        };
        app.navigate(init.initial_route);
        app
    }

    /// Switches view and remounts it, so every visit starts from fresh data.
    fn navigate(&mut self, target: Route) {
        let authenticated = self.runtime.block_on(self.api.session().is_authenticated());
        let route = target.resolve(authenticated);
        self.route = route;
        match route {
            Route::Posts => {
                self.posts = PostsPage::default();
                self.runtime.block_on(self.posts.load(&self.api));
            }
            Route::Feeds => {
                self.feeds = FeedsPage::new(self.config.api.subscription_probe_limit);
                self.runtime.block_on(self.feeds.load(&self.api));
            }
            Route::MyFeed => {
                self.user_feed = UserFeedPage::new(self.config.api.page_size);
                self.runtime.block_on(self.user_feed.mount(&self.api));
            }
            Route::Login => {
                self.login.password.clear();
            }
            Route::Register => {
                self.register = RegisterPage::default();
            }
        }
    }

    fn logout(&mut self) {
        if let Err(err) = self.runtime.block_on(self.api.session().logout()) {
            warn!(error = %err, "could not clear persisted session");
        }
        self.user = self.runtime.block_on(self.api.session().user());
        self.navigate(self.route);
    }

    fn draw_post(&self, ui: &mut egui::Ui, post: &Post) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.vertical(|ui| {
                let title = ui.add(
                    egui::Label::new(
                        RichText::new(&post.title)
                            .strong()
                            .size(16.0)
                            .color(self.config.theme.accent_color32()),
                    )
                    .wrap(true)
                    .sense(egui::Sense::click()),
                );
                if title.on_hover_text(&post.link).clicked() {
                    if let Err(e) = webbrowser::open(&post.link) {
                        warn!(error = %e, link = %post.link, "could not open link");
                    }
                }
                if let Some(date) = post.published {
                    ui.label(
                        RichText::new(
                            date.with_timezone(&chrono::Local)
                                .format("%Y-%m-%d %H:%M")
                                .to_string(),
                        )
                        .color(self.config.theme.secondary_text_color32())
                        .size(12.0),
                    );
                }
                let preview = content_preview(&post.content, self.config.ui.preview_chars);
                if !preview.is_empty() {
                    ui.label(RichText::new(preview).size(13.0));
                }
            });
        });
        ui.add_space(4.0);
    }

    fn draw_nav(&mut self, ctx: &egui::Context) {
        let mut target = None;
        let mut logout = false;
        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("Blog Aggregator").strong());
                ui.separator();
                for route in [Route::Posts, Route::Feeds, Route::MyFeed] {
                    if ui
                        .selectable_label(self.route == route, route.title())
                        .clicked()
                    {
                        target = Some(route);
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match &self.user {
                        Some(user) => {
                            if ui.button("Logout").clicked() {
                                logout = true;
                            }
                            ui.label(
                                RichText::new(&user.username)
                                    .strong()
                                    .color(self.config.theme.accent_color32()),
                            );
                        }
                        None => {
                            if ui.button("Register").clicked() {
                                target = Some(Route::Register);
                            }
                            if ui.button("Login").clicked() {
                                target = Some(Route::Login);
                            }
                        }
                    }
                });
            });
        });

        if logout {
            self.logout();
        } else if let Some(route) = target {
            self.navigate(route);
        }
    }

    fn draw_posts(&mut self, ui: &mut egui::Ui) {
        ui.heading("Latest Posts");
        ui.separator();
        if self.posts.phase == Phase::Loading {
            ui.spinner();
            return;
        }
        status_line(ui, &self.config.theme, self.posts.action.status());
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if self.posts.posts.is_empty() {
                    ui.label(RichText::new("No posts yet").weak());
                }
                for post in &self.posts.posts {
                    self.draw_post(ui, post);
                }
            });
    }

    fn draw_feeds(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Feeds");
            if self.user.is_some() && self.feeds.phase == Phase::Ready {
                ui.label(
                    RichText::new(format!("subscribed to {}", self.feeds.subscriptions.len()))
                        .color(self.config.theme.secondary_text_color32()),
                );
            }
        });
        ui.separator();

        let pending = self.feeds.action.is_pending();
        let mut create = false;
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.feeds.new_title).hint_text("Title"));
            ui.add(
                egui::TextEdit::singleline(&mut self.feeds.new_url)
                    .hint_text("URL")
                    .desired_width(320.0),
            );
            if ui.add_enabled(!pending, egui::Button::new("Add")).clicked() {
                create = true;
            }
        });
        status_line(ui, &self.config.theme, self.feeds.action.status());

        if self.feeds.phase == Phase::Loading {
            ui.spinner();
            return;
        }

        let mut refresh = None;
        let mut subscribe = None;
        let mut unsubscribe = None;
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for feed in &self.feeds.feeds {
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(&feed.title).strong());
                            ui.label(
                                RichText::new(&feed.url)
                                    .size(12.0)
                                    .color(self.config.theme.secondary_text_color32()),
                            );
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if self.feeds.is_subscribed(feed.id) {
                                if ui.add_enabled(!pending, egui::Button::new("Unsubscribe")).clicked() {
                                    unsubscribe = Some(feed.id);
                                }
                            } else if ui.add_enabled(!pending, egui::Button::new("Subscribe")).clicked() {
                                subscribe = Some(feed.id);
                            }
                            if ui.add_enabled(!pending, egui::Button::new("Refresh")).clicked() {
                                refresh = Some(feed.id);
                            }
                        });
                    });
                    ui.separator();
                }
            });

        if create {
            self.runtime.block_on(self.feeds.create(&self.api));
        } else if let Some(id) = refresh {
            self.runtime.block_on(self.feeds.refresh(&self.api, id));
        } else if let Some(id) = subscribe {
            self.runtime.block_on(self.feeds.subscribe(&self.api, id));
        } else if let Some(id) = unsubscribe {
            self.runtime.block_on(self.feeds.unsubscribe(&self.api, id));
        }
    }

    fn draw_user_feed(&mut self, ui: &mut egui::Ui) {
        ui.heading("My Feed");
        ui.separator();
        status_line(ui, &self.config.theme, self.user_feed.action.status());

        let pending = self.user_feed.action.is_pending();
        let mut add = false;
        ui.group(|ui| {
            ui.label(RichText::new("Add a feed and subscribe").strong());
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut self.user_feed.new_title).hint_text("Title"));
                ui.add(egui::TextEdit::singleline(&mut self.user_feed.new_url).hint_text("URL"));
                if ui.add_enabled(!pending, egui::Button::new("Add + Subscribe")).clicked() {
                    add = true;
                }
            });
        });

        let mut subscribe = None;
        let mut prev = false;
        let mut next = false;
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .show(ui, |ui| {
                ui.collapsing("All Feeds", |ui| {
                    for feed in &self.user_feed.feeds {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(&feed.title).strong())
                                .on_hover_text(&feed.url);
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                let subscribed = self.user_feed.is_subscribed(feed.id);
                                let label = if subscribed { "Subscribed" } else { "Subscribe" };
                                if ui
                                    .add_enabled(!subscribed && !pending, egui::Button::new(label))
                                    .clicked()
                                {
                                    subscribe = Some(feed.id);
                                }
                            });
                        });
                    }
                });
                ui.separator();

                if self.user_feed.phase == Phase::Loading {
                    ui.spinner();
                    return;
                }
                if self.user_feed.posts.is_empty() {
                    ui.label(RichText::new("Nothing here yet").weak());
                }
                for post in &self.user_feed.posts {
                    self.draw_post(ui, post);
                }

                let pagination = self.user_feed.pagination;
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(pagination.has_prev() && !pending, egui::Button::new("Prev"))
                        .clicked()
                    {
                        prev = true;
                    }
                    ui.label(format!("Page {}", pagination.page()));
                    if ui
                        .add_enabled(pagination.has_next() && !pending, egui::Button::new("Next"))
                        .clicked()
                    {
                        next = true;
                    }
                });
            });

        if add {
            self.runtime.block_on(self.user_feed.add_and_subscribe(&self.api));
        } else if let Some(id) = subscribe {
            self.runtime.block_on(self.user_feed.subscribe(&self.api, id));
        } else if prev {
            self.runtime.block_on(self.user_feed.prev_page(&self.api));
        } else if next {
            self.runtime.block_on(self.user_feed.next_page(&self.api));
        }
    }

    fn draw_login(&mut self, ui: &mut egui::Ui) {
        let mut submit = false;
        let mut to_register = false;
        ui.vertical_centered(|ui| {
            ui.set_max_width(420.0);
            ui.heading("Login");
            ui.add(egui::TextEdit::singleline(&mut self.login.username).hint_text("Username"));
            let password = ui.add(
                egui::TextEdit::singleline(&mut self.login.password)
                    .password(true)
                    .hint_text("Password"),
            );
            let enter = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let pending = self.login.action.is_pending();
            if ui.add_enabled(!pending, egui::Button::new("Login")).clicked() || enter {
                submit = true;
            }
            status_line(ui, &self.config.theme, self.login.action.status());
            ui.horizontal(|ui| {
                ui.label("Need an account?");
                if ui.link("Register").clicked() {
                    to_register = true;
                }
            });
        });

        if submit {
            if let Some(route) = self.runtime.block_on(self.login.submit(&self.api)) {
                self.user = self.runtime.block_on(self.api.session().user());
                self.navigate(route);
            }
        } else if to_register {
            self.navigate(Route::Register);
        }
    }

    fn draw_register(&mut self, ui: &mut egui::Ui) {
        let mut submit = false;
        let mut to_login = false;
        ui.vertical_centered(|ui| {
            ui.set_max_width(420.0);
            ui.heading("Register");
            ui.add(egui::TextEdit::singleline(&mut self.register.username).hint_text("Username"));
            ui.add(egui::TextEdit::singleline(&mut self.register.email).hint_text("Email"));
            ui.add(
                egui::TextEdit::singleline(&mut self.register.password)
                    .password(true)
                    .hint_text("Password"),
            );
            let pending = self.register.action.is_pending();
            if ui.add_enabled(!pending, egui::Button::new("Create Account")).clicked() {
                submit = true;
            }
            status_line(ui, &self.config.theme, self.register.action.status());
            ui.horizontal(|ui| {
                ui.label("Have an account?");
                if ui.link("Login").clicked() {
                    to_login = true;
                }
            });
        });

        if submit {
            if let Some(route) = self.runtime.block_on(self.register.submit(&self.api)) {
                self.login = LoginPage {
                    username: self.register.username.trim().to_string(),
                    ..LoginPage::default()
                };
                self.login
                    .action
                    .set_status(Some(Status::info(REGISTERED_MESSAGE)));
                self.navigate(route);
            }
        } else if to_login {
            self.navigate(Route::Login);
        }
    }

    fn draw_main_content(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| match self.route {
            Route::Posts => self.draw_posts(ui),
            Route::Feeds => self.draw_feeds(ui),
            Route::MyFeed => self.draw_user_feed(ui),
            Route::Login => self.draw_login(ui),
            Route::Register => self.draw_register(ui),
        });
    }
}

impl eframe::App for AggregatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.draw_nav(ctx);
        self.draw_main_content(ctx);
    }
}
