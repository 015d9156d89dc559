use ratatui::{prelude::*, widgets::*};

use crate::viz::Update;

/// A line chart of one metric over episodes, with bounds growing to fit the data
pub struct Plot {
    title: &'static str,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    data: Vec<(f64, f64)>,
}

impl Plot {
    pub fn new(title: &'static str, episodes: u32) -> Self {
        Self {
            title,
            x_bounds: [0.0, episodes.max(1) as f64],
            y_bounds: [0.0, 1.0],
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, (x, y): (f64, f64)) {
        self.x_bounds[1] = self.x_bounds[1].max(x);
        self.y_bounds[0] = self.y_bounds[0].min(y);
        self.y_bounds[1] = self.y_bounds[1].max(y);
        self.data.push((x, y));
    }

    fn labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
        let mid = (bounds[0] + bounds[1]) / 2.0;
        [bounds[0], mid, bounds[1]]
            .iter()
            .map(|v| format!("{v:.1}").bold())
            .collect()
    }
}

impl Widget for &Plot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dataset = Dataset::default()
            .name(self.title)
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .cyan()
            .data(&self.data);

        let x_axis = Axis::default()
            .title("Episode")
            .dark_gray()
            .labels(Plot::labels(self.x_bounds))
            .bounds(self.x_bounds);

        let y_axis = Axis::default()
            .title(self.title)
            .dark_gray()
            .labels(Plot::labels(self.y_bounds))
            .bounds(self.y_bounds);

        Chart::new(vec![dataset])
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Plots (<- / -> to switch, Tab for logs, q to quit)")
                    .padding(Padding::uniform(2)),
            )
            .x_axis(x_axis)
            .y_axis(y_axis)
            .render(area, buf);
    }
}

/// A set of plots, one shown at a time
pub struct Plots {
    plots: Vec<Plot>,
    selected: usize,
}

impl Plots {
    pub fn new(names: Vec<&'static str>, episodes: u32) -> Self {
        Self {
            plots: names.into_iter().map(|n| Plot::new(n, episodes)).collect(),
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn next_plot(&mut self) {
        if !self.plots.is_empty() {
            self.selected = (self.selected + 1) % self.plots.len();
        }
    }

    pub fn prev_plot(&mut self) {
        let len = self.plots.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Extra values beyond the number of plots are ignored
    pub fn update(&mut self, update: Update) {
        let Update { episode, data } = update;
        for (plot, metric) in self.plots.iter_mut().zip(data) {
            plot.push((episode as f64, metric));
        }
    }
}

impl Widget for &Plots {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [tabs_area, plot_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        Tabs::new(self.plots.iter().map(|p| p.title))
            .white()
            .highlight_style(Style::default().light_green())
            .select(self.selected)
            .render(tabs_area, buf);

        if let Some(plot) = self.plots.get(self.selected) {
            plot.render(plot_area, buf);
        }
    }
}
