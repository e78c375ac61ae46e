//! 图表渲染服务 - 业务能力层
//!
//! 把分析报表渲染为静态 PNG 图表。使用 plotters 的 BitMapBackend，
//! 不依赖系统绘图库，输出目录不存在时自动创建。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::element::Pie;
use plotters::prelude::*;
use tracing::{info, warn};

use crate::analysis::AnalysisReport;
use crate::models::Sentiment;

/// 三个情感标签的固定配色（绿 / 红 / 灰）
const POSITIVE_COLOR: RGBColor = RGBColor(40, 167, 69);
const NEGATIVE_COLOR: RGBColor = RGBColor(220, 53, 69);
const NEUTRAL_COLOR: RGBColor = RGBColor(108, 117, 125);

/// 图表渲染服务
pub struct ChartRenderer {
    output_dir: PathBuf,
}

impl ChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 渲染全部图表，返回生成的文件路径
    pub fn render_all(&self, report: &AnalysisReport) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("无法创建输出目录: {}", self.output_dir.display()))?;

        let mut saved = Vec::new();

        // 1. 总体情感分布饼图
        if report.overall.total_reviews == 0 {
            warn!("⚠️ 没有已评分的评论，跳过总体分布饼图");
        } else {
            let path = self.output_dir.join("overall_sentiment_pie.png");
            self.render_overall_pie(report, &path)
                .with_context(|| format!("渲染饼图失败: {}", path.display()))?;
            saved.push(path);
        }

        // 2. 按类别的情感分布柱状图
        let path = self.output_dir.join("sentiment_by_class_bar.png");
        self.render_class_bars(report, &path)
            .with_context(|| format!("渲染柱状图失败: {}", path.display()))?;
        saved.push(path);

        // 3. 各情感占比最高类别的横向条形图
        let path = self.output_dir.join("top_classes_sentiment.png");
        self.render_top_classes(report, &path)
            .with_context(|| format!("渲染条形图失败: {}", path.display()))?;
        saved.push(path);

        info!(
            "✓ 已在 '{}' 目录生成 {} 张图表",
            self.output_dir.display(),
            saved.len()
        );

        Ok(saved)
    }

    fn render_overall_pie(&self, report: &AnalysisReport, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (800, 640)).into_drawing_area();
        root.fill(&WHITE)?;
        let root = root.titled("Overall Sentiment Distribution", ("sans-serif", 28))?;

        let sizes = vec![
            report.overall.positive,
            report.overall.negative,
            report.overall.neutral,
        ];
        let colors = vec![POSITIVE_COLOR, NEGATIVE_COLOR, NEUTRAL_COLOR];
        let labels = vec![
            "Positive".to_string(),
            "Negative".to_string(),
            "Neutral".to_string(),
        ];

        let center = (400, 310);
        let radius = 220.0;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style(("sans-serif", 20).into_font());
        pie.percentages(("sans-serif", 16).into_font());

        root.draw(&pie)?;
        root.present()?;
        Ok(())
    }

    fn render_class_bars(&self, report: &AnalysisReport, path: &Path) -> Result<()> {
        let classes = distinct_classes(report);
        let class_count = classes.len().max(1);

        let root = BitMapBackend::new(path, (1400, 800)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Sentiment Distribution by Class", ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..class_count as f64, 0f64..110f64)?;

        let label_for = |x: &f64| -> String {
            let idx = x.round() as usize;
            classes.get(idx).cloned().unwrap_or_default()
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(class_count)
            .x_label_formatter(&label_for)
            .x_desc("Class")
            .y_desc("Percentage (%)")
            .draw()?;

        let series = [
            (Sentiment::Positive, POSITIVE_COLOR),
            (Sentiment::Negative, NEGATIVE_COLOR),
            (Sentiment::Neutral, NEUTRAL_COLOR),
        ];

        for (slot, (sentiment, color)) in series.into_iter().enumerate() {
            let bars: Vec<Rectangle<(f64, f64)>> = classes
                .iter()
                .enumerate()
                .filter_map(|(ci, class_name)| {
                    let pct = report
                        .by_class
                        .iter()
                        .find(|s| &s.class_name == class_name && s.sentiment == sentiment)
                        .map(|s| s.percentage)
                        .unwrap_or(0.0);
                    if pct <= 0.0 {
                        return None;
                    }

                    let x0 = ci as f64 + 0.1 + slot as f64 * 0.27;
                    let x1 = x0 + 0.25;
                    Some(Rectangle::new([(x0, 0.0), (x1, pct)], color.filled()))
                })
                .collect();

            chart
                .draw_series(bars)?
                .label(sentiment.as_str())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;

        root.present()?;
        Ok(())
    }

    fn render_top_classes(&self, report: &AnalysisReport, path: &Path) -> Result<()> {
        let entries = [
            ("Highest Positive", &report.top_positive, POSITIVE_COLOR),
            ("Highest Negative", &report.top_negative, NEGATIVE_COLOR),
            ("Highest Neutral", &report.top_neutral, NEUTRAL_COLOR),
        ];

        let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let x_max = entries
            .iter()
            .map(|(_, top, _)| top.percentage)
            .fold(0.0f64, f64::max)
            + 10.0;

        let mut chart = ChartBuilder::on(&root)
            .caption("Top Classes by Sentiment Type", ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(180)
            .build_cartesian_2d(0f64..x_max.max(10.0), 0f64..3f64)?;

        let label_for = |y: &f64| -> String {
            let idx = y.round() as usize;
            entries
                .get(idx)
                .map(|(label, _, _)| label.to_string())
                .unwrap_or_default()
        };

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(3)
            .y_label_formatter(&label_for)
            .x_desc("Percentage (%)")
            .draw()?;

        for (i, (_, top, color)) in entries.into_iter().enumerate() {
            let y0 = i as f64 + 0.2;
            let y1 = i as f64 + 0.8;

            chart.draw_series(std::iter::once(Rectangle::new(
                [(0.0, y0), (top.percentage.max(0.0), y1)],
                color.filled(),
            )))?;

            // 类别名标在条形旁边
            chart.draw_series(std::iter::once(Text::new(
                format!("{} ({:.1}%)", top.class_name, top.percentage),
                (x_max * 0.02, (y0 + y1) / 2.0),
                ("sans-serif", 18).into_font(),
            )))?;
        }

        root.present()?;
        Ok(())
    }
}

/// 报表中出现过的类别，保持首次出现顺序
fn distinct_classes(report: &AnalysisReport) -> Vec<String> {
    let mut classes: Vec<String> = Vec::new();
    for stat in &report.by_class {
        if !classes.contains(&stat.class_name) {
            classes.push(stat.class_name.clone());
        }
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{OverallSentiment, SentimentStat, TopClass};

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            overall: OverallSentiment {
                positive: 50.0,
                negative: 25.0,
                neutral: 25.0,
                total_reviews: 4,
            },
            by_class: vec![
                SentimentStat {
                    class_name: "Dress".to_string(),
                    sentiment: Sentiment::Positive,
                    count: 2,
                    total: 3,
                    percentage: 66.67,
                },
                SentimentStat {
                    class_name: "Dress".to_string(),
                    sentiment: Sentiment::Negative,
                    count: 1,
                    total: 3,
                    percentage: 33.33,
                },
                SentimentStat {
                    class_name: "Pants".to_string(),
                    sentiment: Sentiment::Neutral,
                    count: 1,
                    total: 1,
                    percentage: 100.0,
                },
            ],
            top_positive: TopClass {
                class_name: "Dress".to_string(),
                percentage: 66.67,
            },
            top_negative: TopClass {
                class_name: "Dress".to_string(),
                percentage: 33.33,
            },
            top_neutral: TopClass {
                class_name: "Pants".to_string(),
                percentage: 100.0,
            },
        }
    }

    #[test]
    fn test_distinct_classes_keeps_first_seen_order() {
        let report = sample_report();
        assert_eq!(distinct_classes(&report), vec!["Dress", "Pants"]);
    }

    /// 需要系统字体才能渲染文本，默认忽略：
    /// cargo test test_render_all_creates_files -- --ignored
    #[test]
    #[ignore]
    fn test_render_all_creates_files() {
        let dir = tempfile::tempdir().expect("创建临时目录");
        let renderer = ChartRenderer::new(dir.path());

        let files = renderer.render_all(&sample_report()).expect("渲染图表");

        assert_eq!(files.len(), 3);
        for file in &files {
            assert!(file.exists(), "应该生成文件: {}", file.display());
        }
    }
}
