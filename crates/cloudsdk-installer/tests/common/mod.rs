#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use cloudsdk_util::process::MessageListener;
use cloudsdk_util::progress::ProgressListener;
use flate2::write::GzEncoder;
use flate2::Compression;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String, Option<u64>),
    Update(u64),
    Done,
}

/// Records every progress call; children are recorded separately.
#[derive(Clone, Default)]
pub struct RecordingProgress {
    events: Arc<Mutex<Vec<Event>>>,
    children: Arc<Mutex<Vec<(u64, RecordingProgress)>>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn declared_total(&self) -> Option<u64> {
        self.events().iter().find_map(|e| match e {
            Event::Start(_, total) => *total,
            _ => None,
        })
    }

    pub fn update_sum(&self) -> u64 {
        self.events()
            .iter()
            .map(|e| match e {
                Event::Update(n) => *n,
                _ => 0,
            })
            .sum()
    }

    pub fn update_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Update(_)))
            .count()
    }

    pub fn is_done(&self) -> bool {
        self.events().last() == Some(&Event::Done)
    }

    pub fn children(&self) -> Vec<(u64, RecordingProgress)> {
        self.children.lock().unwrap().clone()
    }
}

impl ProgressListener for RecordingProgress {
    fn start(&mut self, message: &str, total_work: Option<u64>) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Start(message.to_string(), total_work));
    }

    fn update(&mut self, work_done: u64) {
        self.events.lock().unwrap().push(Event::Update(work_done));
    }

    fn done(&mut self) {
        self.events.lock().unwrap().push(Event::Done);
    }

    fn new_child(&mut self, allocation: u64) -> Box<dyn ProgressListener> {
        let child = RecordingProgress::default();
        self.children
            .lock()
            .unwrap()
            .push((allocation, child.clone()));
        Box::new(child)
    }
}

#[derive(Clone, Default)]
pub struct RecordingMessages(pub Arc<Mutex<Vec<String>>>);

impl RecordingMessages {
    pub fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl MessageListener for RecordingMessages {
    fn message(&mut self, raw: &str) {
        self.0.lock().unwrap().push(raw.to_string());
    }
}

/// An archive entry used to build test fixtures.
pub enum Fixture<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8], u32),
}

pub fn write_zip(path: &Path, entries: &[Fixture<'_>]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for entry in entries {
        match entry {
            Fixture::Dir(name) => {
                let options = zip::write::SimpleFileOptions::default().unix_permissions(0o755);
                zip.add_directory(*name, options).unwrap();
            }
            Fixture::File(name, data, mode) => {
                let options = zip::write::SimpleFileOptions::default().unix_permissions(*mode);
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
    }
    zip.finish().unwrap();
}

pub fn write_zip_with_symlink(path: &Path, link: &str, target: &str) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default().unix_permissions(0o644);
    zip.start_file("google-cloud-sdk/real.txt", options).unwrap();
    zip.write_all(b"real").unwrap();
    zip.add_symlink(link, target, zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.finish().unwrap();
}

pub fn write_tar_gz(path: &Path, entries: &[Fixture<'_>]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for entry in entries {
        match entry {
            Fixture::Dir(name) => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Directory);
                header.set_mode(0o755);
                header.set_size(0);
                builder
                    .append_data(&mut header, name, std::io::empty())
                    .unwrap();
            }
            Fixture::File(name, data, mode) => {
                let mut header = tar::Header::new_gnu();
                header.set_entry_type(tar::EntryType::Regular);
                header.set_mode(*mode);
                header.set_size(data.len() as u64);
                builder.append_data(&mut header, name, *data).unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap();
}

/// A `.tar.gz` holding one regular file whose stored name is written
/// verbatim, bypassing the builder's `..` validation.
pub fn write_tar_gz_with_raw_name(path: &Path, raw_name: &str, data: &[u8]) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mut header = tar::Header::new_old();
    let name = raw_name.as_bytes();
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_entry_type(tar::EntryType::Regular);
    header.set_mode(0o644);
    header.set_size(data.len() as u64);
    header.set_cksum();
    builder.append(&header, data).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

pub fn write_tar_gz_with_symlink(path: &Path, link: &str, target: &str) {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let data: &[u8] = b"real";
    let mut file = tar::Header::new_gnu();
    file.set_entry_type(tar::EntryType::Regular);
    file.set_mode(0o644);
    file.set_size(data.len() as u64);
    builder
        .append_data(&mut file, "google-cloud-sdk/real.txt", data)
        .unwrap();

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Symlink);
    header.set_size(0);
    header.set_mode(0o777);
    header.set_link_name(target).unwrap();
    builder
        .append_data(&mut header, link, std::io::empty())
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

/// Serves a single HTTP response on localhost and hands back the raw
/// request it received.
pub struct OneShotServer {
    pub url: String,
    request: JoinHandle<String>,
}

impl OneShotServer {
    pub fn start(status: &str, body: Vec<u8>, send_length: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/sdk/archive.bin", listener.local_addr().unwrap());
        let status = status.to_string();
        let request = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
            }
            let mut head = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
            if send_length {
                head.push_str(&format!("Content-Length: {}\r\n", body.len()));
            }
            head.push_str("\r\n");
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });
        Self { url, request }
    }

    pub fn request(self) -> String {
        self.request.join().unwrap()
    }
}
