use crate::gtfs::error::{Error, LineError};
use crate::gtfs::structs::*;

use serde::{Deserialize, Deserializer};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::str::FromStr;
use std::{fs::File, io};
use zip::ZipArchive;

/// Helper function to deserialize optional fields that might fail to parse
pub fn deserialize_opt<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => match T::from_str(&s) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Ok(None), // Instead of failing, just return None
        },
        None => Ok(None),
    }
}

/// The subset of a GTFS dataset the line exporter consumes.
/// https://gtfs.org/documentation/schedule/reference/#dataset-files
///
/// `routes`, `trips` and `shapes` are mandatory for producing line geometry;
/// `stops` is only needed for the station export and may be absent.
pub struct GtfsDataSet {
    pub routes: Result<Vec<Route>, Error>,
    pub trips: Result<Vec<Trip>, Error>,
    pub shapes: Result<Vec<Shape>, Error>,
    pub stops: Option<Result<Vec<Stop>, Error>>,
}

impl GtfsDataSet {
    /// Read a feed from a zip archive or an extracted GTFS directory.
    pub fn from_path<P>(path: P) -> Result<GtfsDataSet, Error>
    where
        P: AsRef<Path>,
    {
        let p = path.as_ref();
        if p.is_file() {
            GtfsDataSet::read_from_zip(File::open(p)?)
        } else if p.is_dir() {
            GtfsDataSet::read_from_dir(p)
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    /// Read a feed from zip archive bytes already in memory (downloaded feed).
    pub fn from_zip_bytes(bytes: &[u8]) -> Result<GtfsDataSet, Error> {
        GtfsDataSet::read_from_zip(Cursor::new(bytes))
    }

    pub fn print_stats(&self) {
        println!("GTFS data:");
        println!("  Routes: {}", mandatory_file_summary(&self.routes));
        println!("  Trips: {}", mandatory_file_summary(&self.trips));
        println!("  Shapes: {}", mandatory_file_summary(&self.shapes));
        println!("  Stops: {}", optional_file_summary(&self.stops));
    }

    fn read_from_dir(path: &Path) -> Result<GtfsDataSet, Error> {
        Ok(GtfsDataSet {
            routes: GtfsDataSet::read_obj_from_path(path, "routes.txt"),
            trips: GtfsDataSet::read_obj_from_path(path, "trips.txt"),
            shapes: GtfsDataSet::read_obj_from_path(path, "shapes.txt"),
            stops: GtfsDataSet::optional_read_obj_from_path(path, "stops.txt"),
        })
    }

    fn read_from_zip<R>(reader: R) -> Result<GtfsDataSet, Error>
    where
        R: Read + Seek,
    {
        let mut archive = ZipArchive::new(reader)?;
        Ok(GtfsDataSet {
            routes: GtfsDataSet::read_obj_from_archive(&mut archive, "routes.txt"),
            trips: GtfsDataSet::read_obj_from_archive(&mut archive, "trips.txt"),
            shapes: GtfsDataSet::read_obj_from_archive(&mut archive, "shapes.txt"),
            stops: GtfsDataSet::optional_read_obj_from_archive(&mut archive, "stops.txt"),
        })
    }

    fn read_obj_from_archive<R, O>(
        archive: &mut ZipArchive<R>,
        file_name: &str,
    ) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
        R: Read + Seek,
    {
        match archive.by_name(file_name) {
            Ok(entry) => GtfsDataSet::read_obj(entry, file_name),
            Err(zip::result::ZipError::FileNotFound) => {
                Err(Error::MissingFile(file_name.to_owned()))
            }
            Err(e) => Err(Error::Zip(e)),
        }
    }

    fn optional_read_obj_from_archive<R, O>(
        archive: &mut ZipArchive<R>,
        file_name: &str,
    ) -> Option<Result<Vec<O>, Error>>
    where
        for<'de> O: Deserialize<'de>,
        R: Read + Seek,
    {
        match archive.by_name(file_name) {
            Ok(entry) => Some(GtfsDataSet::read_obj(entry, file_name)),
            Err(_) => None,
        }
    }

    fn read_obj_from_path<O>(path: &Path, file_name: &str) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
    {
        let p = path.join(file_name);
        if p.exists() {
            File::open(p)
                .map_err(|e| Error::NamedFileIO {
                    file_name: file_name.to_owned(),
                    source: Box::new(e),
                })
                .and_then(|r| GtfsDataSet::read_obj(r, file_name))
        } else {
            Err(Error::MissingFile(file_name.to_owned()))
        }
    }

    fn optional_read_obj_from_path<O>(path: &Path, file_name: &str) -> Option<Result<Vec<O>, Error>>
    where
        for<'de> O: Deserialize<'de>,
    {
        File::open(path.join(file_name))
            .ok()
            .map(|r| GtfsDataSet::read_obj(r, file_name))
    }

    fn read_obj<T, O>(mut reader: T, file_name: &str) -> Result<Vec<O>, Error>
    where
        for<'de> O: Deserialize<'de>,
        T: io::Read,
    {
        let mut bom = [0; 3];
        reader
            .read_exact(&mut bom)
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?;

        let chained = if bom != [0xefu8, 0xbbu8, 0xbfu8] {
            bom.chain(reader)
        } else {
            [].chain(reader)
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(chained);
        // We store the headers to be able to return them in case of errors
        let headers = reader
            .headers()
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: None,
            })?
            .clone()
            .into_iter()
            .map(|x| x.trim())
            .collect::<csv::StringRecord>();

        // Pre-allocate a StringRecord for performance reasons
        let mut rec = csv::StringRecord::new();
        let mut objs = Vec::new();

        // Read each record into the pre-allocated StringRecord one at a time
        while reader.read_record(&mut rec).map_err(|e| Error::CSVError {
            file_name: file_name.to_owned(),
            source: e,
            line_in_error: None,
        })? {
            let obj = rec
                .deserialize(Some(&headers))
                .map_err(|e| Error::CSVError {
                    file_name: file_name.to_owned(),
                    source: e,
                    line_in_error: Some(LineError {
                        headers: headers.into_iter().map(String::from).collect(),
                        values: rec.into_iter().map(String::from).collect(),
                    }),
                })?;
            objs.push(obj);
        }
        Ok(objs)
    }
}

fn mandatory_file_summary<T>(objs: &Result<Vec<T>, Error>) -> String {
    match objs {
        Ok(vec) => format!("{} objects", vec.len()),
        Err(e) => format!("{e}"),
    }
}

fn optional_file_summary<T>(objs: &Option<Result<Vec<T>, Error>>) -> String {
    match objs {
        Some(objs) => mandatory_file_summary(objs),
        None => "File not present".to_string(),
    }
}
