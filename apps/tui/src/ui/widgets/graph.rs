use oiv_core::{GraphScene, Rgb};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

pub const fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Draws the projected scene: complex circles, connection segments, unit points.
///
/// The focused unit gets a ring and its label.
pub fn render_scene(f: &mut Frame<'_>, area: Rect, scene: &GraphScene, focused: Option<&str>) {
    let focus = focused.and_then(|id| scene.nodes.iter().find(|node| node.id == id));
    let ring = (scene.bounds.x[1] - scene.bounds.x[0]).abs() / 60.0;

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Relationship graph ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .marker(Marker::Braille)
        .x_bounds(scene.bounds.x)
        .y_bounds(scene.bounds.y)
        .paint(|ctx| {
            for circle in &scene.circles {
                ctx.draw(&Circle {
                    x: circle.x,
                    y: circle.y,
                    radius: circle.radius,
                    color: color(circle.color),
                });
            }

            for segment in &scene.segments {
                ctx.draw(&CanvasLine {
                    x1: segment.from.0,
                    y1: segment.from.1,
                    x2: segment.to.0,
                    y2: segment.to.1,
                    color: color(segment.color),
                });
            }

            ctx.layer();

            for node in &scene.nodes {
                let node_color = if node.linked_only {
                    Color::DarkGray
                } else {
                    color(node.color)
                };
                ctx.draw(&Points {
                    coords: &[(node.x, node.y)],
                    color: node_color,
                });
            }

            for circle in &scene.circles {
                ctx.print(
                    circle.x - circle.radius,
                    circle.y + circle.radius,
                    Span::styled(circle.name.clone(), Style::default().fg(color(circle.color))),
                );
            }

            if let Some(node) = focus {
                ctx.draw(&Circle {
                    x: node.x,
                    y: node.y,
                    radius: ring,
                    color: Color::Yellow,
                });
                ctx.print(
                    node.x + ring,
                    node.y,
                    Span::styled(
                        node.label.clone(),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_colors_map_to_terminal_rgb() {
        assert_eq!(color(Rgb(12, 34, 56)), Color::Rgb(12, 34, 56));
        assert_eq!(color(Rgb::GREY), Color::Rgb(128, 128, 128));
    }
}
