//! Builds the paginated itinerary. The composer keeps one vertical cursor,
//! measures every block before placing it, and opens a new page (running
//! header included) whenever a block would cross the bottom margin.

use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use periplo_core::metrics::RouteMetrics;
use periplo_core::route::{Leg, ResolvedRoute, TravelMode};
use periplo_staticmap::MapArtifact;

use crate::blocks::{Block, ItineraryDocument, Page, Positioned};
use crate::export::document_file_name;
use crate::layout::{PageSpec, ellipsize, wrap_text};

const SECTION_GAP: f64 = 4.0;
const BANNER_HEIGHT: f64 = 22.0;
const METRIC_CELL_HEIGHT: f64 = 18.0;
const MAP_FOOTPRINT: f64 = 120.0;
const LEG_CARD_MIN_HEIGHT: f64 = 24.0;
const LEG_CARD_PADDING: f64 = 3.0;
const LEG_CARD_GUTTER: f64 = 6.0;
const ROW_GAP: f64 = 3.0;
const SIGNATURE_ROW_HEIGHT: f64 = 22.0;
/// Labels longer than this are elided with a trailing ellipsis.
const SIGNATURE_LABEL_BUDGET: usize = 24;

const DEFAULT_ROUTE_NAME: &str = "Ruta de supervisión";

/// People assigned to one stop, as the roster collaborator reports them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopRoster {
    pub stop_name: String,
    pub members: Vec<String>,
}

pub struct ItineraryInput<'a> {
    pub route: &'a ResolvedRoute,
    pub metrics: &'a RouteMetrics,
    pub map: &'a MapArtifact,
    pub rosters: &'a [StopRoster],
    pub travel_mode: TravelMode,
    pub route_name: Option<&'a str>,
    pub supervisor_label: Option<&'a str>,
    pub date: jiff::civil::Date,
}

pub fn compose(input: &ItineraryInput, spec: PageSpec) -> ItineraryDocument {
    let route_name = input.route_name.unwrap_or(DEFAULT_ROUTE_NAME);
    let date = input.date.strftime("%d-%m-%Y").to_string();

    let mut composer = Composer::new(spec, route_name, &date);
    composer.banner(input, route_name, &date);
    composer.metrics(input.metrics);
    composer.map(input.map);
    composer.legs(&input.route.legs);
    composer.rosters(input.rosters);
    composer.signatures(input.rosters, input.supervisor_label);

    tracing::debug!(pages = composer.pages.len(), "itinerary composed");

    ItineraryDocument {
        spec: composer.spec,
        pages: composer.pages,
        file_name: document_file_name(input.route_name),
    }
}

struct Composer {
    spec: PageSpec,
    pages: Vec<Page>,
    cursor: f64,
    header_title: String,
    header_subtitle: String,
}

impl Composer {
    fn new(spec: PageSpec, route_name: &str, date: &str) -> Self {
        let mut composer = Composer {
            spec,
            pages: Vec::new(),
            cursor: 0.0,
            header_title: route_name.to_string(),
            header_subtitle: format!("Itinerario de supervisión · {date}"),
        };
        composer.start_page();
        composer
    }

    fn start_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = self.spec.margin;
        self.place(
            self.spec.margin,
            self.spec.content_width(),
            self.spec.header_height,
            Block::PageHeader {
                title: self.header_title.clone(),
                subtitle: self.header_subtitle.clone(),
            },
        );
        self.cursor = self.spec.margin + self.spec.header_height;
    }

    fn ensure_room(&mut self, height: f64) {
        if self.cursor + height > self.spec.content_bottom() {
            self.start_page();
        }
    }

    fn place(&mut self, x: f64, width: f64, height: f64, block: Block) {
        let positioned = Positioned {
            x,
            y: self.cursor,
            width,
            height,
            block,
        };
        if let Some(page) = self.pages.last_mut() {
            page.blocks.push(positioned);
        }
    }

    fn section_title(&mut self, text: &str) {
        let height = self.spec.line_height + 2.0;
        self.ensure_room(height);
        self.place(
            self.spec.margin,
            self.spec.content_width(),
            height,
            Block::SectionTitle { text: text.into() },
        );
        self.cursor += height + ROW_GAP;
    }

    fn banner(&mut self, input: &ItineraryInput, route_name: &str, date: &str) {
        self.ensure_room(BANNER_HEIGHT);
        self.place(
            self.spec.margin,
            self.spec.content_width(),
            BANNER_HEIGHT,
            Block::Banner {
                route_name: route_name.to_string(),
                date: date.to_string(),
                mode_label: match input.travel_mode {
                    TravelMode::Driving => "Vehículo".into(),
                    TravelMode::Transit => "Transporte público".into(),
                },
                supervisor: input.supervisor_label.map(str::to_string),
            },
        );
        self.cursor += BANNER_HEIGHT + SECTION_GAP;
    }

    fn metrics(&mut self, metrics: &RouteMetrics) {
        let cell_width = self.spec.content_width() / 5.0;
        let cells = [
            ("Traslado", format_duration(metrics.travel_duration)),
            ("Permanencia", format_duration(metrics.dwell_duration)),
            ("Total", format_duration(metrics.total_duration)),
            ("Distancia", format_distance(metrics.total_distance_meters)),
            ("Combustible", format_cost(metrics.estimated_fuel_cost)),
        ];

        self.ensure_room(METRIC_CELL_HEIGHT);
        for (index, (label, value)) in cells.into_iter().enumerate() {
            self.place(
                self.spec.margin + index as f64 * cell_width,
                cell_width,
                METRIC_CELL_HEIGHT,
                Block::MetricCell {
                    label: label.into(),
                    value,
                },
            );
        }
        self.cursor += METRIC_CELL_HEIGHT + SECTION_GAP;
    }

    fn map(&mut self, artifact: &MapArtifact) {
        let side = MAP_FOOTPRINT.min(self.spec.content_width());
        self.ensure_room(side);
        self.place(
            self.spec.margin + (self.spec.content_width() - side) / 2.0,
            side,
            side,
            Block::Map {
                artifact: artifact.clone(),
            },
        );
        self.cursor += side + SECTION_GAP;
    }

    fn legs(&mut self, legs: &[Leg]) {
        if legs.is_empty() {
            return;
        }

        self.section_title("Detalle por tramo");

        let card_width = (self.spec.content_width() - LEG_CARD_GUTTER) / 2.0;
        let budget = self.spec.chars_for_width(card_width - 2.0 * LEG_CARD_PADDING);

        for (row, pair) in legs.chunks(2).enumerate() {
            let cards: Vec<(String, Vec<String>, f64)> = pair
                .iter()
                .enumerate()
                .map(|(i, leg)| {
                    let title = format!("Tramo {}", row * 2 + i + 1);
                    let mut lines =
                        wrap_text(&format!("{} → {}", leg.start_address, leg.end_address), budget);
                    lines.push(format!(
                        "{} · {}",
                        format_duration(SignedDuration::from_secs(leg.duration_seconds)),
                        format_distance(leg.distance_meters),
                    ));
                    let measured = (lines.len() + 1) as f64 * self.spec.line_height
                        + 2.0 * LEG_CARD_PADDING;
                    (title, lines, measured.max(LEG_CARD_MIN_HEIGHT))
                })
                .collect();

            let row_height = cards
                .iter()
                .map(|(_, _, height)| *height)
                .fold(LEG_CARD_MIN_HEIGHT, f64::max);

            self.ensure_room(row_height);
            for (column, (title, lines, height)) in cards.into_iter().enumerate() {
                self.place(
                    self.spec.margin + column as f64 * (card_width + LEG_CARD_GUTTER),
                    card_width,
                    height,
                    Block::LegCard { title, lines },
                );
            }
            self.cursor += row_height + ROW_GAP;
        }

        self.cursor += SECTION_GAP - ROW_GAP;
    }

    fn rosters(&mut self, rosters: &[StopRoster]) {
        if rosters.is_empty() {
            return;
        }

        self.section_title("Estudiantes asignados");

        let budget = self.spec.chars_for_width(self.spec.content_width() - 4.0);
        for roster in rosters {
            let names = if roster.members.is_empty() {
                "Sin estudiantes asignados".to_string()
            } else {
                roster.members.join(", ")
            };
            let lines = wrap_text(&names, budget);
            let height = (lines.len() + 1) as f64 * self.spec.line_height + 2.0;

            self.ensure_room(height);
            self.place(
                self.spec.margin,
                self.spec.content_width(),
                height,
                Block::RosterEntry {
                    stop_name: roster.stop_name.clone(),
                    lines,
                },
            );
            self.cursor += height + ROW_GAP;
        }

        self.cursor += SECTION_GAP - ROW_GAP;
    }

    fn signatures(&mut self, rosters: &[StopRoster], supervisor_label: Option<&str>) {
        self.section_title("Firmas");

        let column_width = self.spec.content_width() / 3.0;

        for chunk in rosters.chunks(3) {
            self.ensure_room(SIGNATURE_ROW_HEIGHT);
            for (column, roster) in chunk.iter().enumerate() {
                self.place(
                    self.spec.margin + column as f64 * column_width,
                    column_width - 4.0,
                    SIGNATURE_ROW_HEIGHT,
                    Block::SignatureLine {
                        label: ellipsize(&roster.stop_name, SIGNATURE_LABEL_BUDGET),
                    },
                );
            }
            self.cursor += SIGNATURE_ROW_HEIGHT + ROW_GAP;
        }

        self.ensure_room(SIGNATURE_ROW_HEIGHT);
        self.place(
            self.spec.margin + (self.spec.content_width() - column_width) / 2.0,
            column_width,
            SIGNATURE_ROW_HEIGHT,
            Block::SupervisorSignature {
                label: supervisor_label.unwrap_or("Docente supervisor").to_string(),
            },
        );
        self.cursor += SIGNATURE_ROW_HEIGHT;
    }
}

fn format_duration(duration: SignedDuration) -> String {
    let minutes = duration.as_secs() / 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    if hours > 0 {
        format!("{hours} h {minutes:02} min")
    } else {
        format!("{minutes} min")
    }
}

fn format_distance(meters: f64) -> String {
    format!("{:.1} km", meters / 1000.0)
}

fn format_cost(cost: Option<f64>) -> String {
    match cost {
        Some(cost) => format!("${cost:.0}"),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use periplo_core::metrics::CostModel;
    use periplo_staticmap::Placeholder;

    use super::*;

    fn leg(from: &str, to: &str, duration_seconds: i64, distance_meters: f64) -> Leg {
        Leg {
            start_address: from.into(),
            end_address: to.into(),
            duration_seconds,
            distance_meters,
            steps: vec![],
        }
    }

    fn fixture_route(leg_count: usize) -> ResolvedRoute {
        ResolvedRoute {
            legs: (0..leg_count)
                .map(|i| leg(&format!("Punto {i}"), &format!("Punto {}", i + 1), 600, 5000.0))
                .collect(),
            path: vec![],
        }
    }

    fn fixture_map() -> MapArtifact {
        MapArtifact::Placeholder(Placeholder {
            size: 512.0,
            caption: "Mapa no disponible".into(),
        })
    }

    fn fixture_rosters(count: usize) -> Vec<StopRoster> {
        (0..count)
            .map(|i| StopRoster {
                stop_name: format!("Empresa {i}"),
                members: vec!["Ana Díaz".into(), "Luis Rojas".into()],
            })
            .collect()
    }

    fn compose_fixture(leg_count: usize, spec: PageSpec) -> ItineraryDocument {
        let route = fixture_route(leg_count);
        let metrics = RouteMetrics::compute(&route, TravelMode::Driving, &CostModel::default());
        let map = fixture_map();
        let rosters = fixture_rosters(leg_count.saturating_sub(1).max(1));

        compose(
            &ItineraryInput {
                route: &route,
                metrics: &metrics,
                map: &map,
                rosters: &rosters,
                travel_mode: TravelMode::Driving,
                route_name: Some("Ronda Valparaíso"),
                supervisor_label: Some("Prof. M. Soto"),
                date: jiff::civil::date(2026, 8, 7),
            },
            spec,
        )
    }

    fn kinds(page: &Page) -> Vec<&'static str> {
        page.blocks
            .iter()
            .map(|positioned| match positioned.block {
                Block::PageHeader { .. } => "header",
                Block::Banner { .. } => "banner",
                Block::MetricCell { .. } => "metric",
                Block::Map { .. } => "map",
                Block::LegCard { .. } => "leg",
                Block::SectionTitle { .. } => "title",
                Block::RosterEntry { .. } => "roster",
                Block::SignatureLine { .. } => "signature",
                Block::SupervisorSignature { .. } => "supervisor",
            })
            .collect()
    }

    #[test]
    fn test_first_page_section_order() {
        let document = compose_fixture(2, PageSpec::default());

        let first = kinds(&document.pages[0]);
        let expected: &[&str] = &["header", "banner", "metric", "metric", "metric", "metric", "metric"];
        assert_eq!(&first[..7], expected);
        assert!(first.contains(&"map"));
    }

    #[test]
    fn test_metric_cells_share_one_row() {
        let document = compose_fixture(2, PageSpec::default());

        let cells: Vec<&Positioned> = document.pages[0]
            .blocks
            .iter()
            .filter(|positioned| matches!(positioned.block, Block::MetricCell { .. }))
            .collect();

        assert_eq!(cells.len(), 5);
        assert!(cells.windows(2).all(|pair| pair[0].y == pair[1].y));
        assert!(cells.windows(2).all(|pair| pair[0].x < pair[1].x));
    }

    #[test]
    fn test_cost_cell_shows_dash_without_fuel_cost() {
        let route = fixture_route(2);
        let metrics = RouteMetrics::compute(&route, TravelMode::Transit, &CostModel::default());
        let map = fixture_map();
        let rosters = fixture_rosters(1);

        let document = compose(
            &ItineraryInput {
                route: &route,
                metrics: &metrics,
                map: &map,
                rosters: &rosters,
                travel_mode: TravelMode::Transit,
                route_name: None,
                supervisor_label: None,
                date: jiff::civil::date(2026, 8, 7),
            },
            PageSpec::default(),
        );

        let dash = document.pages[0].blocks.iter().any(|positioned| {
            matches!(
                &positioned.block,
                Block::MetricCell { label, value } if label == "Combustible" && value == "—"
            )
        });
        assert!(dash);
    }

    #[test]
    fn test_overflow_starts_a_new_page_below_its_header() {
        let spec = PageSpec::default();
        let document = compose_fixture(24, spec.clone());

        assert!(document.pages.len() > 1);

        for page in &document.pages[1..] {
            let header = &page.blocks[0];
            assert!(matches!(header.block, Block::PageHeader { .. }));
            assert_eq!(header.y, spec.margin);

            // The first content block lands below the running header, not
            // at the top of the paper
            let first_content = &page.blocks[1];
            assert_eq!(first_content.y, spec.margin + spec.header_height);
        }
    }

    #[test]
    fn test_no_block_crosses_the_bottom_margin() {
        let spec = PageSpec::default();
        let document = compose_fixture(24, spec.clone());

        for page in &document.pages {
            for positioned in &page.blocks {
                assert!(
                    positioned.y + positioned.height <= spec.content_bottom() + 1e-9,
                    "block of height {} placed at y {} overflows",
                    positioned.height,
                    positioned.y,
                );
            }
        }
    }

    #[test]
    fn test_signature_grid_and_supervisor_line() {
        let document = compose_fixture(7, PageSpec::default());

        let signatures: usize = document
            .pages
            .iter()
            .flat_map(|page| &page.blocks)
            .filter(|positioned| matches!(positioned.block, Block::SignatureLine { .. }))
            .count();
        let supervisors: Vec<&Positioned> = document
            .pages
            .iter()
            .flat_map(|page| &page.blocks)
            .filter(|positioned| matches!(positioned.block, Block::SupervisorSignature { .. }))
            .collect();

        // One line per stop (6 rosters for 7 legs), one supervising role
        assert_eq!(signatures, 6);
        assert_eq!(supervisors.len(), 1);
    }

    #[test]
    fn test_long_signature_labels_are_elided() {
        let route = fixture_route(2);
        let metrics = RouteMetrics::compute(&route, TravelMode::Driving, &CostModel::default());
        let map = fixture_map();
        let rosters = vec![StopRoster {
            stop_name: "Sociedad Metalmecánica del Pacífico Austral Limitada".into(),
            members: vec![],
        }];

        let document = compose(
            &ItineraryInput {
                route: &route,
                metrics: &metrics,
                map: &map,
                rosters: &rosters,
                travel_mode: TravelMode::Driving,
                route_name: None,
                supervisor_label: None,
                date: jiff::civil::date(2026, 8, 7),
            },
            PageSpec::default(),
        );

        let elided = document
            .pages
            .iter()
            .flat_map(|page| &page.blocks)
            .find_map(|positioned| match &positioned.block {
                Block::SignatureLine { label } => Some(label.clone()),
                _ => None,
            })
            .unwrap();

        assert!(elided.ends_with('…'));
        assert_eq!(elided.chars().count(), SIGNATURE_LABEL_BUDGET);
    }
}
