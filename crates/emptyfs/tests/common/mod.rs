#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use emptyfs::{EmptyFs, EmptyFsMount, RootSnapshot};
use test_support::mock::cache::MockVnodeCache;
use test_support::mock::clock::MockClock;
use uapi::mount::EmptyFsMountArgs;
use uapi::time::TimeSpec;
use vfs::{MountFlags, MountId, MountRequest, VnodeRef};

pub const RDEV: u64 = 0x0100_0007;
pub const TYPE_NUM: u32 = 23;
pub const CREATE_TIME: TimeSpec = TimeSpec::new(1_234_567, 89);

pub struct Fixture {
    pub cache: Arc<MockVnodeCache>,
    pub clock: Arc<MockClock>,
    pub fs: EmptyFs,
    pub device: VnodeRef,
}

impl Fixture {
    pub fn new() -> Self {
        test_support::mock::arch::install();
        let cache = MockVnodeCache::new();
        let clock = Arc::new(MockClock::new(CREATE_TIME));
        let device = cache.add_block_device(RDEV);
        let fs = EmptyFs::load(cache.clone(), clock.clone(), TYPE_NUM);
        Self {
            cache,
            clock,
            fs,
            device,
        }
    }

    pub fn request<'a>(&self, id: u64, flags: MountFlags, data: &'a [u8]) -> MountRequest<'a> {
        MountRequest {
            mount: MountId(id),
            flags,
            device: self.device,
            data,
            type_num: TYPE_NUM,
        }
    }

    pub fn mount_with(&self, debug_level: u32) -> Arc<EmptyFsMount> {
        let data = mount_args(debug_level, false);
        self.fs
            .mount_volume(&self.request(1, MountFlags::empty(), &data))
            .expect("mount")
    }

    pub fn mount(&self) -> Arc<EmptyFsMount> {
        self.mount_with(1)
    }

    pub fn device_usecount(&self) -> usize {
        self.cache.usecount(self.device).unwrap()
    }
}

pub fn mount_args(debug_level: u32, force_failure: bool) -> Vec<u8> {
    EmptyFsMountArgs::new("/dev/disk7", debug_level, force_failure)
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// 轮询直到根槽满足条件，超时 panic
pub fn wait_for_slot(mount: &EmptyFsMount, what: &str, pred: impl Fn(&RootSnapshot) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if pred(&mount.root_snapshot()) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(1));
    }
}
