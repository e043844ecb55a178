use std::fmt::Write;

use crate::scene::Scene;

/// Standalone SVG document reproducing `scene`: same canvas size, transform, shapes and styling.
pub fn render_svg(scene: &Scene) -> String {
    let style = &scene.style;
    let (w, h) = scene.pixel_size();
    let mut s = String::with_capacity(256 + scene.nodes.len() * 256 + scene.links.len() * 96);

    let _ = write!(
        s,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#
    );

    if let Some(msg) = &scene.placeholder {
        let _ = write!(
            s,
            r#"<text x="{x}" y="{y}" text-anchor="middle" fill="{fill}">{msg}</text>"#,
            x = w as f64 / 2.0,
            y = h as f64 / 2.0,
            fill = esc(&style.placeholder_color),
            msg = esc(msg),
        );
        s.push_str("</svg>");
        return s;
    }

    let _ = write!(
        s,
        r#"<g transform="{}">"#,
        esc(&scene.transform.svg_transform())
    );

    let _ = write!(
        s,
        r#"<g stroke="{}" stroke-opacity="{}">"#,
        esc(&style.link_color),
        style.link_opacity
    );
    for l in &scene.links {
        let _ = write!(
            s,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke-width="{}"/>"#,
            l.from.x, l.from.y, l.to.x, l.to.y, l.width
        );
    }
    s.push_str("</g><g>");

    for n in &scene.nodes {
        let _ = write!(
            s,
            r#"<g transform="translate({},{})"><circle r="{}" fill="{}" stroke="{}" stroke-width="{}"/><title>{}</title>"#,
            n.center.x,
            n.center.y,
            n.radius,
            esc(&n.fill),
            esc(&n.stroke),
            n.stroke_width,
            esc(&n.title),
        );
        if let Some(label) = &n.label {
            let _ = write!(
                s,
                r#"<text dx="{}" dy=".35em" font-size="{}px" fill="{}">{}</text>"#,
                n.label_dx,
                style.font_size,
                esc(&style.label_color),
                esc(label),
            );
        }
        s.push_str("</g>");
    }

    s.push_str("</g></g></svg>");
    s
}

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, CommitGraph, VisibleSet};
    use crate::interaction::Interaction;
    use crate::scene::{SceneInputs, SceneStyle, EMPTY_WINDOW};
    use crate::viewport::Viewport;
    use crate::{CommitRecord, FileChange, Point};

    fn scene_for(graph: &CommitGraph, viewport: Viewport) -> Scene {
        let vis = VisibleSet::all(graph);
        let positions: Vec<Point> = (0..vis.nodes.len())
            .map(|i| Point::new(100.0 + i as f64 * 40.0, 80.0))
            .collect();
        Scene::compose(SceneInputs {
            graph,
            visible: &vis,
            positions: &positions,
            viewport,
            interaction: &Interaction::default(),
            width: 640.0,
            height: 480.0,
            style: &SceneStyle::default(),
        })
    }

    #[test]
    fn placeholder_document_is_centred_text() {
        let svg = render_svg(&scene_for(&CommitGraph::default(), Viewport::default()));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"640\" height=\"480\""));
        assert!(svg.contains(r#"<text x="320" y="240" text-anchor="middle""#));
        assert!(svg.contains(EMPTY_WINDOW));
        assert!(!svg.contains("<circle"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn document_carries_transform_shapes_and_labels() {
        let g = build_graph(
            &[CommitRecord::with_files(vec![
                FileChange::new("src/<weird>&\"name\".ts", 64),
                FileChange::new("b.css", 1),
            ])],
            1.0,
        );
        let vp = Viewport {
            tx: 5.0,
            ty: 6.0,
            k: 1.5,
        };
        let svg = render_svg(&scene_for(&g, vp));

        assert!(svg.contains(r#"<g transform="translate(5,6) scale(1.5)">"#));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains(r##"<circle r="16" fill="#1f77b4""##));
        assert!(svg.contains("&lt;weird&gt;&amp;&quot;name&quot;.ts"));
        assert!(!svg.contains("<weird>"));
        assert_eq!(svg.matches("<text").count(), 1);
    }
}
