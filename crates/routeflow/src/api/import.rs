// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Dragonscale Team

//! CSV bulk import.
//!
//! Columns are `id,kind,name,origin,destination,capacity`. A header that names
//! any of them beyond `id` (any order, case-insensitive) is matched by name.
//! Any other first line is skipped and records are read by position in that
//! column order, which also covers files with a localized header.
//!
//! A record with a non-empty `kind` defines a vertex, a record with `origin`,
//! `destination` and `capacity` defines a route, and a record may do both.
//! Malformed or partial records are skipped and counted.

use routeflow_common::core::id::{RouteId, VertexId};
use routeflow_common::core::model::{Route, Vertex, VertexKind};
use routeflow_common::graph::network_graph::NetworkGraph;
use routeflow_common::Result;
use std::io;
use std::path::Path;
use tracing::{debug, info};

const COLUMNS: [&str; 6] = ["id", "kind", "name", "origin", "destination", "capacity"];

/// Parsed contents of an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkImport {
    pub vertices: Vec<Vertex>,
    /// Routes in file order, with persisted ids 1, 2, ...
    pub routes: Vec<Route>,
    /// Records that were malformed, partial, or defined nothing.
    pub skipped: usize,
}

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Columns {
    positions: [Option<usize>; 6],
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Self {
        let mut named = Self::default();
        for (i, header) in headers.iter().enumerate() {
            let header = header.trim().to_ascii_lowercase();
            if let Some(slot) = COLUMNS.iter().position(|c| *c == header) {
                named.positions[slot] = Some(i);
            }
        }
        // `id` alone does not identify the layout
        if named.positions[1..].iter().any(Option::is_some) {
            return named;
        }

        debug!(header = ?headers, "Header not recognised; reading columns by position");
        Self::positional()
    }

    fn positional() -> Self {
        Self {
            positions: [Some(0), Some(1), Some(2), Some(3), Some(4), Some(5)],
        }
    }

    /// Trimmed, non-empty field for column `name`.
    fn get<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        let slot = COLUMNS.iter().position(|c| *c == name)?;
        let field = record.get(self.positions[slot]?)?.trim();
        (!field.is_empty()).then_some(field)
    }
}

/// What a single record contributed.
enum Parsed {
    Nothing,
    Malformed,
    Defined {
        vertex: Option<Vertex>,
        route: Option<(VertexId, VertexId, u64)>,
    },
}

impl BulkImport {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_path(path)?;
        let import = Self::from_csv(reader)?;
        info!(
            path = %path.display(),
            vertices = import.vertices.len(),
            routes = import.routes.len(),
            skipped = import.skipped,
            "Network imported"
        );
        Ok(import)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let columns = Columns::resolve(reader.headers()?);
        let mut import = Self::default();
        let mut next_route_id = 1u64;

        for (line, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    debug!(record = line + 1, error = %e, "Skipping unreadable record");
                    import.skipped += 1;
                    continue;
                }
            };

            match parse_record(&columns, &record) {
                Parsed::Defined { vertex, route } => {
                    if let Some(vertex) = vertex {
                        import.vertices.push(vertex);
                    }
                    if let Some((origin, destination, capacity)) = route {
                        import.routes.push(
                            Route::new(origin, destination, capacity)
                                .with_id(RouteId(next_route_id)),
                        );
                        next_route_id += 1;
                    }
                }
                Parsed::Malformed | Parsed::Nothing => {
                    debug!(record = line + 1, "Skipping malformed or empty record");
                    import.skipped += 1;
                }
            }
        }

        Ok(import)
    }

    /// Builds a graph from the imported vertices and routes.
    pub fn into_graph(self) -> NetworkGraph {
        let mut graph = NetworkGraph::with_capacity(self.vertices.len());
        for vertex in self.vertices {
            graph.add_vertex(vertex);
        }
        for route in self.routes {
            graph.add_route(route);
        }
        graph
    }
}

fn parse_record(columns: &Columns, record: &csv::StringRecord) -> Parsed {
    let mut malformed = false;

    let vertex = match columns.get(record, "kind") {
        Some(kind) => match columns.get(record, "id").map(str::parse::<u64>) {
            Some(Ok(id)) => {
                let name = columns
                    .get(record, "name")
                    .map_or_else(|| id.to_string(), str::to_string);
                Some(Vertex::new(id, name, VertexKind::from_label(kind)))
            }
            _ => {
                malformed = true;
                None
            }
        },
        None => None,
    };

    let fields = [
        columns.get(record, "origin"),
        columns.get(record, "destination"),
        columns.get(record, "capacity"),
    ];
    let route = match fields {
        [Some(origin), Some(destination), Some(capacity)] => {
            match (origin.parse::<u64>(), destination.parse::<u64>(), capacity.parse::<u64>()) {
                (Ok(o), Ok(d), Ok(c)) => Some((VertexId(o), VertexId(d), c)),
                _ => {
                    malformed = true;
                    None
                }
            }
        }
        [None, None, None] => None,
        _ => {
            malformed = true;
            None
        }
    };

    match (malformed, vertex.is_some() || route.is_some()) {
        (true, _) => Parsed::Malformed,
        (false, false) => Parsed::Nothing,
        (false, true) => Parsed::Defined { vertex, route },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_and_routes() {
        let csv = "id,kind,name,origin,destination,capacity\n\
                   1,storage,Depot A,,,\n\
                   2,Hub,Hub B,,,\n\
                   3,zone,Zone C,,,\n\
                   ,,,1,2,10\n\
                   ,,,2,3,7\n";
        let import = BulkImport::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(import.vertices.len(), 3);
        assert_eq!(import.vertices[0].kind, VertexKind::Depot);
        assert_eq!(import.vertices[2].kind, VertexKind::DeliveryZone);
        assert_eq!(import.routes.len(), 2);
        assert_eq!(import.routes[0].id, Some(RouteId(1)));
        assert_eq!(import.routes[1].id, Some(RouteId(2)));
        assert_eq!(import.skipped, 0);

        let graph = import.into_graph();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.route_count(), 2);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let csv = "id,kind,name,origin,destination,capacity\n\
                   x,hub,Broken,,,\n\
                   4,hub,Ok,,,\n\
                   ,,,4,5,\n\
                   ,,,4,five,3\n\
                   ,,,,,\n\
                   ,,,4,4\n\
                   5,depot,Both,5,4,9\n";
        let import = BulkImport::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(import.vertices.len(), 2);
        assert_eq!(import.routes.len(), 1);
        assert_eq!(import.routes[0].origin, VertexId(5));
        assert_eq!(import.skipped, 5);
    }

    #[test]
    fn test_header_order_and_missing_name() {
        let csv = "capacity,destination,origin,NAME,Kind,ID\n\
                   ,,,,depot,7\n";
        let import = BulkImport::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(import.vertices[0].id, VertexId(7));
        assert_eq!(import.vertices[0].name, "7");
    }

    #[test]
    fn test_unrecognised_header_falls_back_to_positions() {
        let csv = "id,tipo,nome,origem,destino,capacidade\n\
                   1,Deposito,D1,,,\n\
                   2,Hub,H1,,,\n\
                   3,ZonaEntrega,Z1,,,\n\
                   ,,,1,2,10\n\
                   ,,,2,3,7\n";
        let import = BulkImport::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(import.skipped, 0);
        let kinds: Vec<VertexKind> = import.vertices.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![VertexKind::Depot, VertexKind::Hub, VertexKind::DeliveryZone]
        );
        assert_eq!(import.vertices[2].name, "Z1");
        assert_eq!(import.routes.len(), 2);
        assert_eq!(import.routes[1].capacity, 7);
    }

    #[test]
    fn test_first_line_is_always_a_header() {
        // Headerless file: the first record is consumed as the header
        let import = BulkImport::from_reader("1,hub,A,,,\n2,hub,B,,,\n".as_bytes()).unwrap();
        assert_eq!(import.vertices.len(), 1);
        assert_eq!(import.vertices[0].id, VertexId(2));
    }

    #[test]
    fn test_id_only_header_reads_by_position() {
        let import = BulkImport::from_reader("id,x,y\n4,depot,Dock\n".as_bytes()).unwrap();
        assert_eq!(import.vertices[0].kind, VertexKind::Depot);
        assert_eq!(import.vertices[0].name, "Dock");
    }
}
