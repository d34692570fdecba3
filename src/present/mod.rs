//! Result presentation
//!
//! Turns a `ClassificationResult` into a view model and renders it as
//! plain text. Ranked entries keep the order the server returned them in.

use std::fmt::Write as _;

use serde::Serialize;

use crate::classify::ClassificationResult;

/// Default width of a full (100%) bar in terminal cells
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// One ranked genre with its bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarView {
    pub genre: String,
    pub percentage: f64,
    /// Bar length relative to the full width, 0.0-1.0
    pub fill: f64,
    /// Entry for the top genre
    pub highlighted: bool,
}

impl BarView {
    /// Bar length in cells for a bar of `width` cells at 100%
    pub fn cells(&self, width: usize) -> usize {
        (self.fill * width as f64).round() as usize
    }
}

/// Everything needed to draw a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultView {
    Success {
        /// e.g. `rock (81%)`
        headline: String,
        bars: Vec<BarView>,
        /// e.g. `Based on 3 segments`
        footer: String,
    },
    Error {
        message: String,
    },
}

impl ResultView {
    pub fn from_result(result: &ClassificationResult) -> Self {
        match result {
            ClassificationResult::Success { data, .. } => {
                let top = &data.top_prediction;
                let bars = data
                    .ranked_results
                    .iter()
                    .map(|score| BarView {
                        genre: score.genre.clone(),
                        percentage: score.percentage,
                        fill: score.percentage.clamp(0.0, 100.0) / 100.0,
                        highlighted: score.genre == top.genre,
                    })
                    .collect();

                ResultView::Success {
                    headline: format!("{} ({}%)", top.genre, top.confidence),
                    bars,
                    footer: segment_footer(data.segment_count),
                }
            }
            ClassificationResult::Error { message, .. } => ResultView::Error {
                message: message.clone(),
            },
        }
    }

    /// Render as terminal text with bars of `bar_width` cells at 100%
    pub fn render(&self, bar_width: usize) -> String {
        let mut out = String::new();
        match self {
            ResultView::Success {
                headline,
                bars,
                footer,
            } => {
                let _ = writeln!(out, "Top genre: {}", headline);
                let _ = writeln!(out);

                let label_width = bars.iter().map(|b| b.genre.len()).max().unwrap_or(0);
                for bar in bars {
                    let fill = if bar.highlighted { '█' } else { '▒' };
                    let cells = bar.cells(bar_width);
                    let _ = writeln!(
                        out,
                        "{:<label_width$}  {}{}  {}%",
                        bar.genre,
                        fill.to_string().repeat(cells),
                        " ".repeat(bar_width.saturating_sub(cells)),
                        bar.percentage,
                    );
                }

                let _ = writeln!(out);
                let _ = writeln!(out, "{}", footer);
            }
            ResultView::Error { message } => {
                let _ = writeln!(out, "{}", message);
            }
        }
        out
    }
}

fn segment_footer(count: u32) -> String {
    if count == 1 {
        "Based on 1 segment".to_string()
    } else {
        format!("Based on {} segments", count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{FailureKind, GenreScore, Prediction, TopPrediction};
    use pretty_assertions::assert_eq;

    fn rock_pop() -> ClassificationResult {
        ClassificationResult::success(Prediction {
            top_prediction: TopPrediction {
                genre: "rock".to_string(),
                confidence: 81.0,
            },
            ranked_results: vec![
                GenreScore {
                    genre: "rock".to_string(),
                    percentage: 81.0,
                },
                GenreScore {
                    genre: "pop".to_string(),
                    percentage: 19.0,
                },
            ],
            segment_count: 3,
        })
    }

    #[test]
    fn test_success_view() {
        let view = ResultView::from_result(&rock_pop());
        let ResultView::Success {
            headline,
            bars,
            footer,
        } = view
        else {
            panic!("expected success view");
        };

        assert_eq!(headline, "rock (81%)");
        assert_eq!(footer, "Based on 3 segments");
        assert_eq!(bars.len(), 2);
        assert!(bars[0].highlighted);
        assert!(!bars[1].highlighted);
        assert_eq!(bars[0].cells(100), 81);
        assert_eq!(bars[1].cells(100), 19);
    }

    #[test]
    fn test_server_order_is_kept() {
        let mut result = rock_pop();
        if let ClassificationResult::Success { data, .. } = &mut result {
            data.ranked_results.reverse();
        }
        let ResultView::Success { bars, .. } = ResultView::from_result(&result) else {
            panic!("expected success view");
        };
        assert_eq!(bars[0].genre, "pop");
        assert_eq!(bars[1].genre, "rock");
    }

    #[test]
    fn test_out_of_range_percentages_are_clamped() {
        let result = ClassificationResult::success(Prediction {
            top_prediction: TopPrediction {
                genre: "jazz".to_string(),
                confidence: 140.0,
            },
            ranked_results: vec![
                GenreScore {
                    genre: "jazz".to_string(),
                    percentage: 140.0,
                },
                GenreScore {
                    genre: "noise".to_string(),
                    percentage: -5.0,
                },
            ],
            segment_count: 2,
        });

        let view = ResultView::from_result(&result);
        let ResultView::Success { bars, .. } = &view else {
            panic!("expected a success view");
        };
        assert_eq!(bars[0].cells(40), 40);
        assert_eq!(bars[1].cells(40), 0);
        assert_eq!(bars[0].percentage, 140.0);
        assert_eq!(bars[1].percentage, -5.0);

        let text = view.render(4);
        assert!(text.contains("jazz   ████  140%\n"));
        assert!(text.contains("noise        -5%\n"));
    }

    #[test]
    fn test_fractional_percentage_label() {
        let result = ClassificationResult::success(Prediction {
            top_prediction: TopPrediction {
                genre: "jazz".to_string(),
                confidence: 33.33,
            },
            ranked_results: vec![GenreScore {
                genre: "jazz".to_string(),
                percentage: 33.33,
            }],
            segment_count: 1,
        });
        let text = ResultView::from_result(&result).render(10);
        assert!(text.contains("jazz (33.33%)"));
        assert!(text.contains("Based on 1 segment"));
    }

    #[test]
    fn test_render_success() {
        let text = ResultView::from_result(&rock_pop()).render(10);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Top genre: rock (81%)");
        assert_eq!(lines[2], "rock  ████████    81%");
        assert_eq!(lines[3], "pop   ▒▒          19%");
        assert_eq!(lines[5], "Based on 3 segments");
    }

    #[test]
    fn test_render_error_shows_message_only() {
        let result = ClassificationResult::error(FailureKind::Server, "Empty filename");
        assert_eq!(ResultView::from_result(&result).render(10), "Empty filename\n");
    }
}
