// * byte identity for sequential writes with a block size that does not divide the data
// * random-position writes land where they were addressed, in order
// * discontinuities force short flushes
// * close flushes, is idempotent, and refuses further writes

mod common;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use proptest::prelude::*;
    use queue_file::file::{FileType, KFile, MemFile};
    use queue_file::queue_file::{make_write_behind, QueueFileConfig, WriteBehindFile};
    use queue_file::types::FileError;

    use crate::common::{init_logging, patterned};

    #[test]
    fn test_sequential_writes_match_input() {
        init_logging();
        let data = patterned(10_007);
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 1000, 333, 5).unwrap();

        let mut pos = 0u64;
        for chunk in data.chunks(97) {
            assert_eq!(f.write_at(pos, chunk).unwrap(), chunk.len());
            pos += chunk.len() as u64;
        }
        f.close().unwrap();
        assert_eq!(dest.contents(), data);
    }

    #[test]
    fn test_large_single_write_is_split_into_blocks() {
        let data = patterned(1000);
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 10_000, 64, 5).unwrap();
        assert_eq!(f.write_at(0, &data).unwrap(), 1000);
        f.close().unwrap();

        let t = f.telemetry();
        assert_eq!(t.counters.blocks_pushed, 16);
        assert_eq!(t.counters.bytes_popped, 1000);
        assert_eq!(dest.contents(), data);
    }

    #[test]
    fn test_discontinuous_writes_flush_short() {
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 1024, 16, 5).unwrap();
        f.write_at(0, b"abc").unwrap();
        f.write_at(100, b"def").unwrap();
        f.close().unwrap();

        let contents = dest.contents();
        assert_eq!(contents.len(), 103);
        assert_eq!(&contents[..3], b"abc");
        assert!(contents[3..100].iter().all(|&b| b == 0));
        assert_eq!(&contents[100..], b"def");
        // one at the jump, one for the tail at close
        assert_eq!(f.telemetry().counters.short_flushes, 2);
    }

    #[test]
    fn test_overwrites_apply_in_order() {
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 1024, 8, 5).unwrap();
        f.write_at(0, b"aaaaaaaa").unwrap();
        f.write_at(2, b"bb").unwrap();
        f.write_at(0, b"c").unwrap();
        f.close().unwrap();
        assert_eq!(dest.contents(), b"cabbaaaa");
    }

    #[test]
    fn test_queue_smaller_than_block() {
        let data = patterned(500);
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 1, 64, 5).unwrap();
        f.write_at(0, &data).unwrap();
        f.close().unwrap();
        assert_eq!(dest.contents(), data);
    }

    #[test]
    fn test_close_is_idempotent() {
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 64, 16, 5).unwrap();
        f.write_at(0, b"hello").unwrap();
        f.close().unwrap();
        f.close().unwrap();
        assert!(f.is_closed());
        assert!(matches!(f.write_at(5, b"!"), Err(FileError::Sealed)));
        assert_eq!(dest.contents(), b"hello");
    }

    #[test]
    fn test_drop_flushes() {
        let dest = MemFile::new();
        {
            let mut f = make_write_behind(dest.clone(), 64, 16, 5).unwrap();
            f.write_at(0, b"written on drop").unwrap();
        }
        assert_eq!(dest.contents(), b"written on drop");
    }

    #[test]
    fn test_std_write_adapter() {
        let dest = MemFile::new();
        let mut f = make_write_behind(dest.clone(), 256, 10, 5).unwrap();
        writeln!(f, "line one").unwrap();
        f.write_all(b"line two\n").unwrap();
        Write::flush(&mut f).unwrap();
        assert_eq!(f.staged(), 0);
        drop(f);
        assert_eq!(dest.contents(), b"line one\nline two\n");
    }

    #[test]
    fn test_kfile_surface() {
        let mut f = make_write_behind(MemFile::from_vec(vec![1; 7]), 64, 16, 5).unwrap();
        assert_eq!(f.file_type(), FileType::Fifo);
        assert!(f.write_enabled());
        assert!(!f.read_enabled());
        assert!(matches!(f.random_access(), Err(FileError::RandomAccessUnsupported)));
        let mut buf = [0u8; 1];
        assert!(matches!(f.read_at(0, &mut buf), Err(FileError::WriteOnly)));
        assert_eq!(f.size().unwrap(), 7);
    }

    #[test]
    fn test_set_size_passes_through() {
        let dest = MemFile::from_vec(vec![9; 100]);
        let mut f = make_write_behind(dest.clone(), 64, 16, 5).unwrap();
        f.set_size(10).unwrap();
        assert_eq!(f.size().unwrap(), 10);
        assert_eq!(dest.len(), 10);
    }

    #[test]
    fn test_into_inner_returns_destination() {
        let cfg = QueueFileConfig::new(64, 4, 5);
        let mut f = WriteBehindFile::with_config(MemFile::new(), &cfg).unwrap();
        f.write_at(0, b"0123456789").unwrap();
        let dest = f.into_inner().unwrap();
        assert_eq!(dest.contents(), b"0123456789");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_positional_writes_match_direct(
            writes in proptest::collection::vec(
                (0u64..500, proptest::collection::vec(any::<u8>(), 1..50)),
                0..40,
            ),
            block_size in 1usize..64,
            queue_bytes in 1usize..256,
        ) {
            let mut expected = MemFile::new();
            for (pos, bytes) in &writes {
                expected.write_at(*pos, bytes).unwrap();
            }

            let dest = MemFile::new();
            let mut f = make_write_behind(dest.clone(), queue_bytes, block_size, 1).unwrap();
            for (pos, bytes) in &writes {
                prop_assert_eq!(f.write_at(*pos, bytes).unwrap(), bytes.len());
            }
            f.close().unwrap();
            prop_assert_eq!(dest.contents(), expected.contents());
            prop_assert!(f.telemetry().sanity_check());
        }
    }
}
