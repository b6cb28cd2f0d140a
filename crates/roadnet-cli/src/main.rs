//! roadnet CLI - road network meshing and routing
//!
//! Loads a JSON network document, then reports on it, meshes it, or routes
//! across it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roadnet::roadnet_mesh::{find_clusters, find_free_endpoints};
use roadnet::{Curve, CurveId, NetworkSettings, Point3, RoadMeshKind, RoadNetwork, RouteOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

mod document;
mod obj;

use document::NetworkDocument;

#[derive(Parser)]
#[command(name = "roadnet")]
#[command(about = "Road network meshing and routing", long_about = None)]
struct Cli {
    /// TOML settings file overriding the defaults
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,
    /// Log debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display information about a network document
    Info {
        /// Path to the network .json file
        file: PathBuf,
    },
    /// Generate road surface meshes
    Mesh {
        /// Path to the network .json file
        file: PathBuf,
        /// Write the meshes to a Wavefront .obj file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find a route between two points
    Route {
        /// Path to the network .json file
        file: PathBuf,
        /// Start point as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Point3,
        /// Target point as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point3,
        /// Keep to the right-hand lane
        #[arg(long)]
        right_offset: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let settings = load_settings(cli.settings.as_deref())?;

    match cli.command {
        Commands::Info { file } => {
            show_info(&load_network(&file, settings)?, &file);
        }
        Commands::Mesh { file, output } => {
            mesh_network(&load_network(&file, settings)?, output.as_deref())?;
        }
        Commands::Route {
            file,
            from,
            to,
            right_offset,
        } => {
            let network = load_network(&file, settings)?;
            route(&network, &from, &to, RouteOptions { right_offset })?;
        }
    }

    Ok(())
}

fn parse_point(s: &str) -> Result<Point3, String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;
    match coords.as_slice() {
        [x, y, z] => Ok(Point3::new(*x, *y, *z)),
        [x, y] => Ok(Point3::new(*x, *y, 0.0)),
        _ => Err(format!("expected x,y,z but got '{s}'")),
    }
}

fn load_settings(path: Option<&Path>) -> Result<NetworkSettings> {
    let Some(path) = path else {
        return Ok(NetworkSettings::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    NetworkSettings::from_toml_str(&text).with_context(|| format!("loading {}", path.display()))
}

fn load_network(file: &Path, settings: NetworkSettings) -> Result<RoadNetwork> {
    let json =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let doc = NetworkDocument::from_json(&json)?;
    let network = doc.to_network(settings)?;
    info!(curves = network.len(), "loaded {}", file.display());
    Ok(network)
}

fn show_info(network: &RoadNetwork, file: &Path) {
    let curves: Vec<(CurveId, &dyn Curve)> = network.curves().collect();
    let mesh = &network.settings().mesh;
    let clusters = find_clusters(&curves, mesh.junction_tolerance);
    let free = find_free_endpoints(&curves, &clusters, mesh.free_endpoint_tolerance);
    let length: f64 = curves.iter().map(|(_, c)| c.length()).sum();

    println!("road network: {}", file.display());
    println!("  Curves: {}", network.len());
    println!("  Total length: {:.1}", length);
    println!("  Graph nodes: {}", network.graph().len());
    println!("  Graph links: {}", network.graph().edge_count());
    println!("  Junctions: {}", clusters.len());
    println!("  Free endpoints: {}", free.len());
    println!(
        "  Quadtree: {} nodes, depth {}",
        network.index().node_count(),
        network.index().depth()
    );
}

fn mesh_network(network: &RoadNetwork, output: Option<&Path>) -> Result<()> {
    let meshes = network.generate_road_mesh();
    let junctions = meshes
        .iter()
        .filter(|m| matches!(m.kind, RoadMeshKind::Junction { .. }))
        .count();
    let total_tris: usize = meshes.iter().map(|m| m.mesh.num_triangles()).sum();
    let total_verts: usize = meshes.iter().map(|m| m.mesh.num_vertices()).sum();

    println!("Mesh stats:");
    println!("  Segments: {}", meshes.len() - junctions);
    println!("  Junctions: {}", junctions);
    println!("  Total triangles: {}", total_tris);
    println!("  Total vertices: {}", total_verts);

    if let Some(output) = output {
        let text = obj::write_obj(&meshes)?;
        fs::write(output, text).with_context(|| format!("writing {}", output.display()))?;
        println!("Exported OBJ to {}", output.display());
    }
    Ok(())
}

fn route(network: &RoadNetwork, from: &Point3, to: &Point3, options: RouteOptions) -> Result<()> {
    let path = network.route(from, to, options);
    if path.is_empty() {
        anyhow::bail!("No route between the given start and target");
    }
    let length: f64 = path.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    println!("Route: {} points, length {:.1}", path.len(), length);
    for p in &path {
        println!("  {:.3} {:.3} {:.3}", p.x, p.y, p.z);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1,2,3").unwrap(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(parse_point(" -5.5, 4 ").unwrap(), Point3::new(-5.5, 4.0, 0.0));
        assert!(parse_point("1,2,3,4").is_err());
        assert!(parse_point("a,b,c").is_err());
    }

    #[test]
    fn test_cli_parses_route() {
        let cli = Cli::try_parse_from([
            "roadnet",
            "route",
            "net.json",
            "--from",
            "0,0,0",
            "--to",
            "-10,5,0",
            "--right-offset",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Route {
                from,
                to,
                right_offset,
                ..
            } => {
                assert_eq!(from, Point3::origin());
                assert_eq!(to, Point3::new(-10.0, 5.0, 0.0));
                assert!(right_offset);
            }
            _ => panic!("expected route command"),
        }
    }

    #[test]
    fn test_default_settings_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings.search_radius, 2500.0);
    }
}
