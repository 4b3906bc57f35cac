use lazy_static::lazy_static;
use rand::rngs::ThreadRng;
use rand::Rng;

lazy_static! {
    static ref PUSH_CHARS: Vec<char> =
        "-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz"
            .chars()
            .collect();
}

const TIME_CHARS: usize = 8;
const RAND_CHARS: usize = 12;

/// Generates 20 character record ids: an 8 character timestamp prefix,
/// so ids sort by creation time, followed by 12 random characters.
pub struct UidGenerator {
    last_rand_chars: [usize; RAND_CHARS],
    last_push_time: u128,
    rand_gen: ThreadRng,
}

impl Default for UidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl UidGenerator {
    pub fn new() -> Self {
        UidGenerator {
            last_rand_chars: [0; RAND_CHARS],
            last_push_time: 0,
            rand_gen: rand::thread_rng(),
        }
    }

    pub fn generate(&mut self, now: u128) -> String {
        let duplicate_time = now == self.last_push_time;
        self.last_push_time = now;

        let mut time_stamp_chars = ['0'; TIME_CHARS];
        let mut temp_now = now;
        for slot in time_stamp_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(temp_now % 64) as usize];
            temp_now /= 64;
        }

        let mut result = time_stamp_chars.iter().collect::<String>();

        if duplicate_time {
            self.increment();
        } else {
            for slot in self.last_rand_chars.iter_mut() {
                *slot = self.rand_gen.gen_range(0..64);
            }
        }

        for &rand_char_idx in self.last_rand_chars.iter() {
            result.push(PUSH_CHARS[rand_char_idx]);
        }
        debug_assert_eq!(result.len(), TIME_CHARS + RAND_CHARS);

        result
    }

    fn increment(&mut self) {
        for slot in self.last_rand_chars.iter_mut().rev() {
            if *slot != 63 {
                *slot += 1;
                return;
            }
            *slot = 0;
        }
    }
}
